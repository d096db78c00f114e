use payflow::domain::smart_switch::NetworkDisambiguator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn card_switch() -> NetworkDisambiguator {
    let mut switch = NetworkDisambiguator::new();
    switch.add_selection_pattern("VISA", "4").unwrap();
    switch.add_selection_pattern("MASTERCARD", "5[1-5]").unwrap();
    switch.add_selection_pattern("AMEX", "3[47]").unwrap();
    switch
}

#[test]
fn test_random_input_never_breaks_switch_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut switch = card_switch();

    for _ in 0..1000 {
        let len = rng.gen_range(0..10);
        let input: String = (0..len)
            .map(|_| char::from(b'0' + rng.gen_range(0..10)))
            .collect();

        switch.evaluate(&input);

        // The selection set is always a subset of the registered networks.
        let selected: Vec<String> = switch.selected_codes().map(String::from).collect();
        assert!(selected.len() <= 3);
        for code in &selected {
            assert!(["VISA", "MASTERCARD", "AMEX"].contains(&code.as_str()));
        }

        // Evaluation is deterministic: the same input never reports a change
        // on the second pass, and the active network stays put.
        let active = switch.active_network().map(str::to_string);
        assert!(!switch.evaluate(&input));
        assert_eq!(switch.active_network().map(str::to_string), active);

        // An active network is always a member of the selection, or the
        // group's first network while several are still possible.
        if let Some(active) = active {
            assert!(selected.contains(&active) || active == "VISA");
        }
    }

    // Whatever the history was, reset restores the full eligible set.
    switch.reset();
    assert_eq!(switch.selected_codes().count(), 3);
    assert_eq!(switch.active_network(), Some("VISA"));
}

#[test]
fn test_long_garbage_input_with_separators() {
    let mut switch = card_switch();
    switch.evaluate("  41-11 1111 1111 1111##");
    assert_eq!(switch.active_network(), Some("VISA"));
    switch.evaluate("no digits at all");
    assert_eq!(switch.active_network(), Some("VISA"));
    assert!(!switch.is_determined());
}
