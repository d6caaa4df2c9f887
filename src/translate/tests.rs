use super::*;
use crate::diff::parse_diff;

fn run(kind: LineKind, count: u32) -> LineRun {
    LineRun::new(kind, count, String::new())
}

/// Two hunks: line 7 replaced, then two lines inserted after old line 11.
fn two_hunk_runs() -> Vec<LineRun> {
    vec![
        LineRun::gap(6),
        run(LineKind::Deleted, 1),
        run(LineKind::Added, 1),
        run(LineKind::Unmodified, 1),
        LineRun::gap(1),
        run(LineKind::Unmodified, 2),
        run(LineKind::Added, 2),
        run(LineKind::Unmodified, 1),
    ]
}

#[test]
fn lines_before_first_hunk_are_unchanged() {
    let runs = two_hunk_runs();
    for line in 1..=6 {
        assert_eq!(map(&runs, line), line);
        assert!(locate(&runs, line).is_kept());
    }
}

#[test]
fn gap_between_hunks_maps_through_accumulated_offsets() {
    let runs = two_hunk_runs();
    assert_eq!(map(&runs, 8), 8);
    assert_eq!(map(&runs, 9), 9);
    assert_eq!(map(&runs, 10), 10);
    assert_eq!(map(&runs, 11), 11);
    assert_eq!(map(&runs, 12), 14);
}

#[test]
fn lines_after_last_hunk_shift_by_net_delta() {
    let runs = two_hunk_runs();
    assert_eq!(map(&runs, 13), 15);
    assert_eq!(map(&runs, 100), 102);
}

#[test]
fn deleted_line_resolves_to_following_new_line() {
    let runs = two_hunk_runs();
    assert_eq!(locate(&runs, 7), LinePosition::Dropped { following: 7 });
    assert_eq!(map(&runs, 7), 7);

    let runs = vec![LineRun::gap(2), run(LineKind::Deleted, 3), run(LineKind::Unmodified, 1)];
    for line in 3..=5 {
        assert_eq!(locate(&runs, line), LinePosition::Dropped { following: 3 });
    }
    assert_eq!(locate(&runs, 6), LinePosition::Kept(3));
}

#[test]
fn insertion_at_top_shifts_every_line() {
    let runs = vec![run(LineKind::Added, 2)];
    assert_eq!(map(&runs, 1), 3);
    assert_eq!(map(&runs, 40), 42);
}

#[test]
fn empty_runs_are_identity() {
    assert_eq!(map(&[], 17), 17);
    assert_eq!(map_new_to_old(&[], 17), 17);
}

#[test]
fn mapping_is_monotonic() {
    let runs = two_hunk_runs();
    let mapped: Vec<u32> = (1..=30).map(|line| map(&runs, line)).collect();
    assert!(mapped.windows(2).all(|w| w[0] <= w[1]), "{mapped:?}");

    let reversed: Vec<u32> = (1..=30).map(|line| map_new_to_old(&runs, line)).collect();
    assert!(reversed.windows(2).all(|w| w[0] <= w[1]), "{reversed:?}");
}

#[test]
fn reverse_mapping_mirrors_forward_mapping() {
    let runs = two_hunk_runs();
    assert_eq!(locate_new_to_old(&runs, 7), LinePosition::Dropped { following: 8 });
    assert_eq!(locate_new_to_old(&runs, 8), LinePosition::Kept(8));
    assert_eq!(locate_new_to_old(&runs, 12), LinePosition::Dropped { following: 12 });
    assert_eq!(locate_new_to_old(&runs, 14), LinePosition::Kept(12));
    assert_eq!(map_new_to_old(&runs, 15), 13);
}

/// Every surviving line of a real edit maps onto identical content.
#[test]
fn mapping_agrees_with_file_contents() {
    let old: Vec<String> = (1..=20).map(|i| format!("l{i}")).collect();
    let mut new: Vec<String> = old.clone();
    new[2] = "L3".to_string();
    new.drain(11..13);
    new.splice(8..8, ["n1".to_string(), "n2".to_string()]);

    let diff = r#"diff --git a/f.c b/f.c
index 1111111..2222222 100644
--- a/f.c
+++ b/f.c
@@ -3 +3 @@
-l3
+L3
@@ -8,0 +9,2 @@
+n1
+n2
@@ -12,2 +13,0 @@
-l12
-l13
"#;
    let set = parse_diff(diff).unwrap();
    let runs = &set.get("f.c").unwrap().lines;

    for (idx, text) in old.iter().enumerate() {
        let line = idx as u32 + 1;
        match locate(runs, line) {
            LinePosition::Kept(target) => assert_eq!(&new[target as usize - 1], text),
            LinePosition::Dropped { .. } => assert!(matches!(line, 3 | 12 | 13), "line {line}"),
        }
    }

    for (idx, text) in new.iter().enumerate() {
        let line = idx as u32 + 1;
        match locate_new_to_old(runs, line) {
            LinePosition::Kept(source) => assert_eq!(&old[source as usize - 1], text),
            LinePosition::Dropped { .. } => assert!(matches!(line, 3 | 9 | 10), "line {line}"),
        }
    }
}

/// Function context after `@@` must not shift any mapping.
#[test]
fn mapping_with_header_context_agrees_with_file_contents() {
    let old: Vec<String> = (1..=20).map(|i| format!("l{i}")).collect();
    let mut new: Vec<String> = old.clone();
    new[2] = "L3".to_string();
    new.drain(11..13);
    new.splice(8..8, ["n1".to_string(), "n2".to_string()]);

    let diff = r#"diff --git a/f.c b/f.c
index 1111111..2222222 100644
--- a/f.c
+++ b/f.c
@@ -3 +3 @@ int setup(void)
-l3
+L3
@@ -8,0 +9,2 @@ static int bind_device(struct device *dev)
+n1
+n2
@@ -12,2 +13,0 @@ static int bind_device(struct device *dev)
-l12
-l13
"#;
    let set = parse_diff(diff).unwrap();
    let entry = set.get("f.c").unwrap();
    assert_eq!((entry.old_line_count(), entry.new_line_count()), (13, 13));

    for (idx, text) in old.iter().enumerate() {
        let line = idx as u32 + 1;
        match locate(&entry.lines, line) {
            LinePosition::Kept(target) => assert_eq!(&new[target as usize - 1], text),
            LinePosition::Dropped { .. } => assert!(matches!(line, 3 | 12 | 13), "line {line}"),
        }
    }

    for (idx, text) in new.iter().enumerate() {
        let line = idx as u32 + 1;
        match locate_new_to_old(&entry.lines, line) {
            LinePosition::Kept(source) => assert_eq!(&old[source as usize - 1], text),
            LinePosition::Dropped { .. } => assert!(matches!(line, 3 | 9 | 10), "line {line}"),
        }
    }
}

#[test]
fn deleted_line_under_header_context_is_dropped() {
    let diff = r#"diff --git a/main.c b/main.c
index 1111111..2222222 100644
@@ -9,3 +9,2 @@ int main(void)
 l9
-l10
 l11
"#;
    let set = parse_diff(diff).unwrap();
    let entry = set.get("main.c").unwrap();

    assert_eq!(entry.old_line_count(), 11);
    assert_eq!(locate(&entry.lines, 9), LinePosition::Kept(9));
    assert_eq!(locate(&entry.lines, 10), LinePosition::Dropped { following: 10 });
    assert_eq!(locate(&entry.lines, 11), LinePosition::Kept(10));
    assert_eq!(locate(&entry.lines, 30), LinePosition::Kept(29));
}

#[test]
fn translator_handles_unchanged_deleted_and_added_files() {
    let diff = r#"diff --git a/a.c b/a.c
index 1111111..2222222 100644
@@ -2,0 +3 @@
+x
diff --git a/gone.c b/gone.c
deleted file mode 100644
@@ -1 +0,0 @@
-y
diff --git a/fresh.c b/fresh.c
new file mode 100644
@@ -0,0 +1 @@
+z
"#;
    let set = parse_diff(diff).unwrap();
    let translator = LineTranslator::new(&set);

    assert_eq!(translator.map("a.c", 2).unwrap(), 2);
    assert_eq!(translator.map("a.c", 3).unwrap(), 4);
    assert_eq!(translator.map("untouched.c", 9).unwrap(), 9);
    assert!(translator.map("gone.c", 1).unwrap_err().is_not_found());
    assert!(translator.map("fresh.c", 1).unwrap_err().is_not_found());

    assert_eq!(
        translator.locate_reverse("a.c", 3).unwrap(),
        LinePosition::Dropped { following: 3 }
    );
    assert!(translator.locate_reverse("fresh.c", 1).unwrap_err().is_not_found());
}
