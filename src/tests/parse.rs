use pretty_assertions::assert_eq;

use crate::parse::{parse, LineFlags, Redir, RedirMode, RedirSrc};
use crate::prelude::*;

fn argv(line: &str, stage: usize) -> Vec<String> {
	parse(line).unwrap().stages[stage].argv.clone()
}

#[test]
fn splits_on_whitespace() {
	assert_eq!(argv("echo hello world\n", 0), vec!["echo", "hello", "world"]);
	assert_eq!(argv("  echo   hello  ", 0), vec!["echo", "hello"]);
}

#[test]
fn rejoining_tokens_reproduces_the_line() {
	let line = "grep -rn main src lib";
	assert_eq!(argv(line, 0).join(" "), line);
}

#[test]
fn quoted_spans_are_one_token() {
	assert_eq!(
		argv("echo 'hello world' again", 0),
		vec!["echo", "hello world", "again"]
	);
	assert_eq!(
		argv("echo \"foo bar\" 'baz qux'", 0),
		vec!["echo", "foo bar", "baz qux"]
	);
}

#[test]
fn quote_styles_do_not_nest() {
	assert_eq!(argv("echo 'it \"counts\" once'", 0), vec!["echo", "it \"counts\" once"]);
	assert_eq!(argv("echo \"don't\"", 0), vec!["echo", "don't"]);
}

#[test]
fn closing_quote_ends_the_token() {
	assert_eq!(argv("echo \"ab\"cd", 0), vec!["echo", "ab", "cd"]);
}

#[test]
fn pipe_splits_stages() {
	let parsed = parse("cat f.txt | grep x | wc -l").unwrap();
	assert_eq!(parsed.stages.len(), 3);
	assert_eq!(parsed.stages[0].argv, vec!["cat", "f.txt"]);
	assert_eq!(parsed.stages[1].argv, vec!["grep", "x"]);
	assert_eq!(parsed.stages[2].argv, vec!["wc", "-l"]);
	assert_eq!(parsed.extern_count(), 3);
}

#[test]
fn blank_lines_yield_no_stages() {
	assert!(parse("").unwrap().is_blank());
	assert!(parse("   \n").unwrap().is_blank());
}

#[test]
fn incomplete_pipelines_yield_no_stages() {
	assert!(parse("echo abc | grep a |").unwrap().is_blank());
	assert!(parse("| echo").unwrap().is_blank());
	assert!(parse("a | | b").unwrap().is_blank());
}

#[test]
fn trailing_ampersand_marks_background() {
	let parsed = parse("sleep 5 &").unwrap();
	assert!(parsed.background());
	assert_eq!(parsed.stages[0].argv, vec!["sleep", "5"]);
}

#[test]
fn lone_ampersand_is_blank() {
	assert!(parse("&").unwrap().is_blank());
	assert!(parse("echo a | &").unwrap().is_blank());
}

#[test]
fn foreground_line_has_no_flags() {
	let parsed = parse("echo hello").unwrap();
	assert_eq!(parsed.flags, LineFlags::empty());
}

#[test]
fn output_redirection_defaults_to_stdout() {
	let parsed = parse("echo hi > out.txt").unwrap();
	assert_eq!(parsed.stages[0].argv, vec!["echo", "hi"]);
	assert_eq!(
		parsed.stages[0].redirs,
		vec![Redir {
			tgt_fd: STDOUT_FILENO,
			mode: RedirMode::Output,
			src: RedirSrc::File(PathBuf::from("out.txt")),
		}]
	);
}

#[test]
fn input_redirection_defaults_to_stdin() {
	let parsed = parse("wc -l < in.txt").unwrap();
	assert_eq!(
		parsed.stages[0].redirs,
		vec![Redir {
			tgt_fd: STDIN_FILENO,
			mode: RedirMode::Input,
			src: RedirSrc::File(PathBuf::from("in.txt")),
		}]
	);
}

#[test]
fn attached_operand_needs_no_space() {
	let parsed = parse("echo hi >out.txt").unwrap();
	assert_eq!(
		parsed.stages[0].redirs[0].src,
		RedirSrc::File(PathBuf::from("out.txt"))
	);
}

#[test]
fn digit_prefix_is_the_target_descriptor() {
	let parsed = parse("cmd 2>err.txt").unwrap();
	assert_eq!(parsed.stages[0].redirs[0].tgt_fd, 2);
	assert_eq!(parsed.stages[0].argv, vec!["cmd"]);
}

#[test]
fn ampersand_operand_duplicates_a_descriptor() {
	let parsed = parse("cmd 2>&1").unwrap();
	assert_eq!(
		parsed.stages[0].redirs,
		vec![Redir {
			tgt_fd: 2,
			mode: RedirMode::Output,
			src: RedirSrc::Fd(1),
		}]
	);
}

#[test]
fn redirections_keep_source_order() {
	let parsed = parse("2> e.txt /bin/echo >d.txt hello").unwrap();
	assert_eq!(parsed.stages[0].argv, vec!["/bin/echo", "hello"]);
	assert_eq!(parsed.stages[0].redirs.len(), 2);
	assert_eq!(parsed.stages[0].redirs[0].tgt_fd, 2);
	assert_eq!(parsed.stages[0].redirs[1].tgt_fd, 1);
}

#[test]
fn operator_without_operand_is_an_error() {
	assert!(parse("echo >").is_err());
}

#[test]
fn redirection_without_command_is_an_error() {
	assert!(parse("> file").is_err());
}

#[test]
fn nondigit_descriptor_prefix_is_an_error() {
	assert!(parse("echo abc>file").is_err());
}

#[test]
fn builtins_are_classified() {
	for name in ["jobs", "bg", "fg", "adduser", "history", "logout", "quit"] {
		assert!(parse(name).unwrap().stages[0].builtin, "{name}");
	}
	assert!(!parse("ls").unwrap().stages[0].builtin);
	assert!(!parse("/bin/echo hi").unwrap().stages[0].builtin);
}

#[test]
fn history_replay_is_builtin_and_skips_history() {
	let parsed = parse("!3").unwrap();
	assert!(parsed.stages[0].builtin);
	assert!(parsed.flags.contains(LineFlags::SKIP_HISTORY));
}

#[test]
fn replay_anywhere_in_a_pipeline_skips_history() {
	let parsed = parse("!2 | grep a").unwrap();
	assert!(parsed.flags.contains(LineFlags::SKIP_HISTORY));
	assert_eq!(parsed.extern_count(), 1);
}

#[test]
fn builtin_stage_mixes_with_external_stages() {
	let parsed = parse("history | grep cat").unwrap();
	assert!(parsed.stages[0].builtin);
	assert!(!parsed.stages[1].builtin);
	assert_eq!(parsed.extern_count(), 1);
}
