//! Built-in raccoon facts.

use rand::Rng;
use rand::seq::SliceRandom;

/// Default start for fact listings.
pub const DEFAULT_FACT_FROM: u32 = 0;

pub const FACTS: &[&str] = &[
    "Raccoons are native to North America.",
    "A group of raccoons is called a gaze.",
    "Raccoons have very dexterous front paws with five fingers each.",
    "The black fur around a raccoon's eyes may help reduce glare and improve night vision.",
    "Raccoons are mostly nocturnal, though they are sometimes active during the day.",
    "Raccoons are omnivores and will eat fruit, insects, eggs, fish and, famously, leftovers.",
    "A raccoon's sense of touch is its most important sense for finding food.",
    "Raccoons often appear to wash their food; wetting their paws makes them more sensitive.",
    "Raccoons can remember the solutions to tasks for up to three years.",
    "Baby raccoons are called kits.",
    "A litter usually has between two and five kits.",
    "Raccoons can rotate their hind feet 180 degrees, which lets them climb down trees head first.",
    "Raccoons are strong swimmers and can stay in the water for hours.",
    "In the wild, raccoons typically live two to three years.",
    "Raccoons can run at speeds of up to about 24 kilometres per hour.",
    "The raccoon's scientific name is Procyon lotor.",
    "Raccoons have adapted well to cities, where they are often more numerous than in forests.",
    "Raccoons communicate with more than fifty different sounds, including purrs, chitters and growls.",
    "Raccoons do not hibernate, but they may sleep through cold spells in winter dens.",
    "A raccoon's tail usually has between four and ten dark rings.",
    "Raccoons were introduced to parts of Europe and Japan in the 20th century.",
    "Adult raccoons usually weigh between 5 and 12 kilograms.",
    "Raccoon dens are often found in hollow trees, but attics and chimneys are popular too.",
    "Raccoons are sometimes called trash pandas.",
    "The word raccoon comes from a Powhatan word meaning 'one who scratches with its hands'.",
    "Raccoons can open latches, jars and some doors.",
    "Male raccoons are called boars and females are called sows.",
];

/// Uniform draw from [`FACTS`].
pub fn random_fact<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    FACTS.choose(rng).copied().unwrap_or(FACTS[0])
}

/// `take` facts starting at `from`, clamped to the list.
pub fn list_facts(from: u32, take: u32) -> Vec<&'static str> {
    FACTS
        .iter()
        .skip(from as usize)
        .take(take as usize)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_fact_comes_from_list() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert!(FACTS.contains(&random_fact(&mut rng)));
        }
    }

    #[test]
    fn test_list_defaults() {
        let facts = list_facts(DEFAULT_FACT_FROM, 25);
        assert_eq!(facts.len(), 25.min(FACTS.len()));
        assert_eq!(facts[0], FACTS[0]);
    }

    #[test]
    fn test_list_is_clamped() {
        let len = FACTS.len() as u32;
        assert_eq!(list_facts(len - 2, 25), FACTS[FACTS.len() - 2..].to_vec());
        assert!(list_facts(len, 5).is_empty());
        assert!(list_facts(len + 100, 5).is_empty());
        assert!(list_facts(0, 0).is_empty());
    }
}
