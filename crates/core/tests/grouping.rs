use cardroom_core::{group_hand, CardId, CardInstance};
use std::collections::BTreeSet;

fn hand(labels: &[&str]) -> Vec<CardInstance> {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| CardInstance::new(idx as u64 + 1, *label))
        .collect()
}

fn group_labels(labels: &[&str]) -> Vec<String> {
    group_hand(&hand(labels))
        .into_iter()
        .map(|group| group.label)
        .collect()
}

macro_rules! order_case {
    ($name:ident, [$($input:expr),*], [$($expected:expr),*]) => {
        #[test]
        fn $name() {
            assert_eq!(group_labels(&[$($input),*]), vec![$($expected.to_string()),*]);
        }
    };
}

order_case!(orders_by_rank_then_suit, ["A♠", "2♣", "2♦", "K♥"], ["2♣", "2♦", "K♥", "A♠"]);
order_case!(ten_sits_between_nine_and_jack, ["J♣", "T♣", "9♣"], ["9♣", "T♣", "J♣"]);
order_case!(suits_break_rank_ties, ["5♠", "5♥", "5♦", "5♣"], ["5♣", "5♦", "5♥", "5♠"]);
order_case!(placeholders_sort_first, ["3♣", "??", "2♠"], ["??", "2♠", "3♣"]);
order_case!(same_rank_and_suit_falls_back_to_text, ["T♥", "10♥"], ["10♥", "T♥"]);

#[test]
fn empty_hand_has_no_groups() {
    assert!(group_hand(&[]).is_empty());
}

#[test]
fn duplicates_share_a_group_but_keep_identities() {
    let cards = vec![
        CardInstance::new(10, "7♣"),
        CardInstance::new(3, "K♠"),
        CardInstance::new(11, "7♣"),
    ];
    let groups = group_hand(&cards);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].label, "7♣");
    assert_eq!(groups[0].members, vec![CardId(10), CardId(11)]);
    assert_eq!(groups[1].members, vec![CardId(3)]);
}

#[test]
fn groups_partition_the_hand() {
    let cards = hand(&["Q♦", "Q♦", "2♣", "??", "Q♦", "A♥", "2♣"]);
    let groups = group_hand(&cards);
    let mut seen = Vec::new();
    for group in &groups {
        seen.extend(group.members.iter().copied());
    }
    assert_eq!(seen.len(), cards.len());
    let unique: BTreeSet<CardId> = seen.iter().copied().collect();
    let expected: BTreeSet<CardId> = cards.iter().map(|card| card.id).collect();
    assert_eq!(unique, expected);
}
