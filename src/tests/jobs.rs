use pretty_assertions::assert_eq;

use crate::jobs::{JobState, JobTab, MAXJOBS};
use crate::prelude::*;

fn pid(raw: i32) -> Pid {
	Pid::from_raw(raw)
}

fn tab_with_one_job() -> JobTab {
	let mut tab = JobTab::new();
	tab.add(
		pid(100),
		vec![pid(100), pid(101), pid(102)],
		JobState::Background,
		"cmd1 | cmd2 | cmd3 &",
	)
	.unwrap();
	tab
}

#[test]
fn add_allocates_dense_job_ids() {
	let mut tab = JobTab::new();
	assert_eq!(tab.add(pid(100), vec![pid(100)], JobState::Background, "a &").unwrap(), 1);
	assert_eq!(tab.add(pid(200), vec![pid(200)], JobState::Background, "b &").unwrap(), 2);
	assert_eq!(tab.add(pid(300), vec![pid(300)], JobState::Background, "c &").unwrap(), 3);
}

#[test]
fn add_rejects_an_invalid_process_group() {
	let mut tab = JobTab::new();
	assert!(tab.add(pid(0), vec![], JobState::Background, "").is_err());
}

#[test]
fn add_fails_when_the_table_is_full() {
	let mut tab = JobTab::new();
	for i in 0..MAXJOBS as i32 {
		tab.add(pid(100 + i), vec![pid(100 + i)], JobState::Background, "x &")
			.unwrap();
	}
	assert!(tab
		.add(pid(999), vec![pid(999)], JobState::Background, "x &")
		.is_err());
}

#[test]
fn removal_keeps_ids_dense() {
	let mut tab = JobTab::new();
	tab.add(pid(100), vec![pid(100)], JobState::Background, "a &").unwrap();
	tab.add(pid(200), vec![pid(200)], JobState::Background, "b &").unwrap();
	tab.add(pid(300), vec![pid(300)], JobState::Background, "c &").unwrap();

	assert!(tab.remove(pid(200)));
	// Largest live id is 3, so the next job gets 4
	assert_eq!(tab.add(pid(400), vec![pid(400)], JobState::Background, "d &").unwrap(), 4);

	assert!(tab.remove(pid(300)));
	assert!(tab.remove(pid(400)));
	// Only id 1 is live now
	assert_eq!(tab.add(pid(500), vec![pid(500)], JobState::Background, "e &").unwrap(), 2);
}

#[test]
fn ids_restart_once_the_table_drains() {
	let mut tab = JobTab::new();
	for i in 0..MAXJOBS as i32 {
		tab.add(pid(100 + i), vec![pid(100 + i)], JobState::Background, "x &")
			.unwrap();
	}
	for i in 0..MAXJOBS as i32 {
		assert!(tab.remove(pid(100 + i)));
	}
	assert!(tab.is_empty());
	assert_eq!(tab.add(pid(700), vec![pid(700)], JobState::Background, "y &").unwrap(), 1);
}

#[test]
fn remove_of_an_unknown_group_is_false() {
	let mut tab = tab_with_one_job();
	assert!(!tab.remove(pid(999)));
	assert!(tab.by_pgid(pid(100)).is_some());
}

#[test]
fn every_member_pid_resolves_to_its_job() {
	let tab = tab_with_one_job();
	for member in [100, 101, 102] {
		let job = tab.by_pid(pid(member)).unwrap();
		assert_eq!(job.pgid(), pid(100));
		assert_eq!(job.jid(), 1);
		assert_eq!(job.cmdline(), "cmd1 | cmd2 | cmd3 &");
	}
	assert!(tab.by_pid(pid(103)).is_none());
}

#[test]
fn lookup_by_pgid_and_jid_agree() {
	let tab = tab_with_one_job();
	let by_pgid = tab.by_pgid(pid(100)).unwrap();
	let by_jid = tab.by_jid(1).unwrap();
	assert_eq!(by_pgid.jid(), by_jid.jid());
	assert!(tab.by_pgid(pid(42)).is_none());
	assert!(tab.by_jid(0).is_none());
	assert!(tab.by_jid(9).is_none());
}

#[test]
fn tokens_resolve_jobs() {
	let tab = tab_with_one_job();
	assert_eq!(tab.by_token("%1").unwrap().pgid(), pid(100));
	assert_eq!(tab.by_token("100").unwrap().pgid(), pid(100));
	assert!(tab.by_token("%9").is_none());
	assert!(tab.by_token("101").is_none()); // member pid is not a group
	assert!(tab.by_token("abc").is_none());
	assert!(tab.by_token("%").is_none());
}

#[test]
fn at_most_one_job_is_foreground() {
	let mut tab = JobTab::new();
	tab.add(pid(100), vec![pid(100)], JobState::Foreground, "a").unwrap();
	assert_eq!(tab.fg_pgid(), Some(pid(100)));

	// Stopping it frees the foreground for another job
	tab.by_pgid_mut(pid(100)).unwrap().set_state(JobState::Stopped);
	assert_eq!(tab.fg_pgid(), None);

	tab.add(pid(200), vec![pid(200)], JobState::Foreground, "b").unwrap();
	assert_eq!(tab.fg_pgid(), Some(pid(200)));
	assert!(tab.any_stopped());
}

#[test]
fn reaped_count_never_passes_the_member_total() {
	let mut tab = tab_with_one_job();
	let job = tab.by_pid_mut(pid(101)).unwrap();
	assert_eq!(job.reaped(), 0);
	job.note_reaped();
	job.note_reaped();
	assert!(!job.all_reaped());
	job.note_reaped();
	assert!(job.all_reaped());
	job.note_reaped();
	assert_eq!(job.reaped(), 3);
}

#[test]
fn full_reap_cycle_removes_the_job() {
	let mut tab = tab_with_one_job();
	// The reaper's walk: resolve each terminated member by pid, count it,
	// and remove the job the moment the counts meet
	for member in [102, 100, 101] {
		let job = tab.by_pid_mut(pid(member)).unwrap();
		job.note_reaped();
		let pgid = job.pgid();
		if job.all_reaped() {
			assert!(tab.remove(pgid));
		}
	}
	assert!(tab.is_empty());
	assert!(tab.by_pid(pid(100)).is_none());
}

#[test]
fn listing_shows_slot_order_and_state_labels() {
	let mut tab = JobTab::new();
	tab.add(pid(100), vec![pid(100)], JobState::Background, "sleep 5 &").unwrap();
	tab.add(pid(200), vec![pid(200)], JobState::Stopped, "vim notes").unwrap();
	assert_eq!(
		tab.render_list(),
		"[1] (100) Running sleep 5 &\n[2] (200) Stopped vim notes\n"
	);
}
