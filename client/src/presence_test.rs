use super::*;

#[test]
fn replace_discards_previous_state() {
    let mut presence = Presence::default();
    presence.add("carol");
    presence.add("dave");

    presence.replace(["alice", "bob"]);

    assert_eq!(presence.users(), ["alice", "bob"]);
    assert!(!presence.contains("carol"));
}

#[test]
fn replace_collapses_duplicates() {
    let mut presence = Presence::default();
    presence.replace(["alice", "bob", "alice"]);
    assert_eq!(presence.users(), ["bob", "alice"]);
}

#[test]
fn add_moves_rejoining_user_to_end() {
    let mut presence = Presence::default();
    presence.replace(["alice", "bob"]);
    presence.add("alice");
    assert_eq!(presence.users(), ["bob", "alice"]);
    assert_eq!(presence.len(), 2);
}

#[test]
fn remove_reports_membership() {
    let mut presence = Presence::default();
    presence.add("alice");
    assert!(presence.remove("alice"));
    assert!(!presence.remove("alice"));
    assert!(presence.is_empty());
}

#[test]
fn clear_empties_roster() {
    let mut presence = Presence::default();
    presence.replace(["alice"]);
    presence.clear();
    assert!(presence.is_empty());
}
