use super::cancel::NeverCancel;
use super::search::ChargeSearch;

/// All stoichiometric ratios `n` with `1 <= n[i] <= threshold` and `Σ n[i]·ox[i] == 0`, in
/// lexicographic order.
///
/// With `primitive_only`, ratios sharing a common factor (e.g. `[2, 2]` next to `[1, 1]`)
/// are dropped.
pub fn neutral_ratios(oxidation_states: &[i32], threshold: u32, primitive_only: bool) -> Vec<Vec<u32>> {
    if oxidation_states.is_empty() || threshold == 0 {
        return Vec::new();
    }
    let levels: Vec<Vec<i64>> = oxidation_states
        .iter()
        .map(|&ox| (1..=i64::from(threshold)).map(|n| n * i64::from(ox)).collect())
        .collect();

    let mut ratios = Vec::new();
    ChargeSearch::new(&levels, 0).run(
        &NeverCancel,
        |choice| {
            let ratio: Vec<u32> = choice.iter().map(|&i| i as u32 + 1).collect();
            if !primitive_only || ratio.iter().copied().fold(0, gcd) == 1 {
                ratios.push(ratio);
            }
        },
        || {},
    );
    ratios
}

/// Whether some ratio within `threshold` neutralises `oxidation_states`.
pub fn is_neutral(oxidation_states: &[i32], threshold: u32) -> bool {
    !neutral_ratios(oxidation_states, threshold, true).is_empty()
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iron_oxide_ratios() {
        assert_eq!(neutral_ratios(&[3, -2], 4, false), vec![vec![2, 3]]);
        assert_eq!(
            neutral_ratios(&[2, -2], 3, false),
            vec![vec![1, 1], vec![2, 2], vec![3, 3]]
        );
        assert_eq!(neutral_ratios(&[2, -2], 3, true), vec![vec![1, 1]]);
    }

    #[test]
    fn ternary_ratios_are_lexicographic() {
        // Ba2+ Ti4+ O2-: 2a + 4b = 2c.
        let ratios = neutral_ratios(&[2, 4, -2], 3, true);
        assert_eq!(ratios, vec![vec![1, 1, 3]]);
        let all = neutral_ratios(&[1, 1, -1], 2, false);
        assert_eq!(all, vec![vec![1, 1, 2]]);
    }

    #[test]
    fn same_sign_states_never_balance() {
        assert!(neutral_ratios(&[1, 2], 8, false).is_empty());
        assert!(!is_neutral(&[3, 1], 8));
        assert!(is_neutral(&[1, -1], 1));
    }

    #[test]
    fn degenerate_inputs_give_nothing() {
        assert!(neutral_ratios(&[], 4, false).is_empty());
        assert!(neutral_ratios(&[1, -1], 0, false).is_empty());
    }
}
