use autocommit_git::StatusSnapshot;

/// Width of the porcelain `XY ` status-code prefix
pub const STATUS_PREFIX_WIDTH: usize = 3;

/// Whether moving from `previous` to `current` should trigger a commit.
///
/// A transition to a clean tree never does: changes that vanished without
/// this watcher committing them (e.g. reverted by hand) need no commit.
pub fn has_actionable_change(previous: &StatusSnapshot, current: &StatusSnapshot) -> bool {
    current != previous && !current.is_clean()
}

/// Paths named by a snapshot, in status order.
///
/// Lines too short to carry a path after the status prefix are skipped.
pub fn extract_changed_paths(snapshot: &StatusSnapshot) -> Vec<String> {
    snapshot
        .lines()
        .filter_map(|line| line.get(STATUS_PREFIX_WIDTH..))
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(s: &str) -> StatusSnapshot {
        StatusSnapshot::from_porcelain(s)
    }

    #[test]
    fn test_same_snapshot_is_never_actionable() {
        for s in ["", " M a.txt", "?? new.txt\n D gone.txt", "R  old -> new"] {
            assert!(!has_actionable_change(&snap(s), &snap(s)), "{:?}", s);
        }
    }

    #[test]
    fn test_new_changes_are_actionable() {
        let previous = snap("");
        let current = snap(" M file.txt\n?? new.txt");
        assert!(has_actionable_change(&previous, &current));
        assert_eq!(extract_changed_paths(&current), ["file.txt", "new.txt"]);
    }

    #[test]
    fn test_further_changes_are_actionable() {
        assert!(has_actionable_change(
            &snap(" M a.txt"),
            &snap(" M a.txt\n M b.txt")
        ));
        assert!(has_actionable_change(&snap(" M a.txt"), &snap("MM a.txt")));
    }

    #[test]
    fn test_reversion_to_clean_is_not_actionable() {
        assert!(!has_actionable_change(&snap(" M a.txt\n?? b.txt"), &snap("")));
    }

    #[test]
    fn test_short_lines_are_skipped() {
        let s = snap("?? a.txt\nXY\n M \n D deleted.rs");
        assert_eq!(extract_changed_paths(&s), ["a.txt", "deleted.rs"]);
    }

    #[test]
    fn test_paths_keep_status_order_and_renames_verbatim() {
        let s = snap("R  old.txt -> new.txt\n?? z.txt\nA  a.txt");
        assert_eq!(
            extract_changed_paths(&s),
            ["old.txt -> new.txt", "z.txt", "a.txt"]
        );
    }

    #[test]
    fn test_clean_snapshot_has_no_paths() {
        assert!(extract_changed_paths(&snap("")).is_empty());
    }
}
