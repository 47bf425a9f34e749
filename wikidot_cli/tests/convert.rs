mod common;

use clap::Parser;
use predicates::prelude::PredicateBooleanExt;
use wikidot_cli::WikidotCli;
use wikidot_core::AnyEmptyResult;
use wikidot_core::WikidotConfig;

#[test]
fn converts_stdin_to_stdout() {
	let mut cmd = common::wikidot_cmd();
	cmd.write_stdin("**bold** text\n")
		.assert()
		.success()
		.stdout("<p><strong>bold</strong> text</p>\n");
}

#[test]
fn dash_reads_stdin() {
	let mut cmd = common::wikidot_cmd();
	cmd.arg("-")
		.write_stdin("* one\n* two\n")
		.assert()
		.success()
		.stdout("<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n");
}

#[test]
fn converts_file_to_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("page.txt");
	let output = tmp.path().join("page.html");
	std::fs::write(&input, "+ Title\n\nSome //text//.\n")?;

	let mut cmd = common::wikidot_cmd();
	cmd.arg(&input)
		.arg("--output")
		.arg(&output)
		.current_dir(tmp.path())
		.assert()
		.success()
		.stdout("");

	let html = std::fs::read_to_string(&output)?;
	similar_asserts::assert_eq!(
		html,
		"<h1 id=\"toc0\"><span>Title</span></h1>\n<p>Some <em>text</em>.</p>\n"
	);

	Ok(())
}

#[test]
fn discovers_config_under_path() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("wikidot.toml"),
		"link_prefix = \"https://example.com/wiki/\"\nlink_suffix = \".html\"\n",
	)?;

	let mut cmd = common::wikidot_cmd();
	cmd.arg("--path")
		.arg(tmp.path())
		.write_stdin("[[[page|Label]]]\n")
		.assert()
		.success()
		.stdout("<p><a href=\"https://example.com/wiki/page.html\">Label</a></p>\n");

	Ok(())
}

#[test]
fn flags_override_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = tmp.path().join("site.toml");
	std::fs::write(
		&config,
		"link_prefix = \"https://example.com/wiki\"\nlink_suffix = \".html\"\n",
	)?;

	let mut cmd = common::wikidot_cmd();
	cmd.arg("--config")
		.arg(&config)
		.arg("--link-suffix")
		.arg(".htm")
		.write_stdin("[[[page|Label]]]\n")
		.assert()
		.success()
		.stdout("<p><a href=\"https://example.com/wiki/page.htm\">Label</a></p>\n");

	Ok(())
}

#[test]
fn failure_exits_with_line_number_and_no_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let output = tmp.path().join("page.html");

	let mut cmd = common::wikidot_cmd();
	cmd.arg("--output")
		.arg(&output)
		.current_dir(tmp.path())
		.write_stdin("fine\n\n##red|a ##blue|b## c##\n")
		.assert()
		.code(2)
		.stdout("")
		.stderr(
			predicates::str::contains("line 3")
				.and(predicates::str::contains("nested color spans are not supported")),
		);

	assert!(!output.exists());

	Ok(())
}

#[test]
fn invalid_config_is_reported() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".wikidot.toml"), "image_prefix = 3\n")?;

	let mut cmd = common::wikidot_cmd();
	cmd.arg("--path")
		.arg(tmp.path())
		.write_stdin("text\n")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn missing_input_file_is_reported() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::wikidot_cmd();
	cmd.arg(tmp.path().join("missing.txt"))
		.current_dir(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to read"));

	Ok(())
}

#[test]
fn overrides_replace_only_given_values() {
	let cli = WikidotCli::parse_from(["wikidot-html", "--image-prefix", "/img/"]);
	let config = cli.apply_overrides(WikidotConfig {
		image_prefix: "https://cdn.example.com/".into(),
		link_prefix: "https://example.com".into(),
		link_suffix: ".html".into(),
	});

	assert_eq!(config.image_prefix, "/img/");
	assert_eq!(config.link_prefix, "https://example.com");
	assert_eq!(config.link_suffix, ".html");
	assert!(cli.reads_stdin());
}
