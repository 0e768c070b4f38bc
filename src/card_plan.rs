use std::ops::RangeInclusive;

use rayon::prelude::*;

use crate::error::LayoutError;
use crate::params::LayoutParameters;

/// A horizontal band of one card and the contiguous run of seed words it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPlan {
    /// Global, 1-based: card `k` owns sections `(k-1)*split+1 ..= k*split`.
    pub number: usize,
    /// 1-based word numbers.
    pub words: RangeInclusive<usize>,
}

impl SectionPlan {
    pub fn word_count(&self) -> usize {
        self.words.clone().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPlan {
    pub number: usize,
    pub sections: Vec<SectionPlan>,
}

impl CardPlan {
    pub fn word_count(&self) -> usize {
        self.sections.iter().map(SectionPlan::word_count).sum()
    }

    pub fn first_word(&self) -> usize {
        self.sections
            .first()
            .map(|section| *section.words.start())
            .unwrap_or(0)
    }

    pub fn word_numbers(&self) -> impl Iterator<Item = usize> + '_ {
        self.sections.iter().flat_map(|section| section.words.clone())
    }
}

impl LayoutParameters {
    /// Word assignment of card `card_number` (1-based, up to the effective
    /// card count). Sections are emitted in order until one reaches the end of
    /// the seed; nothing after it is emitted.
    pub fn card_plan(&self, card_number: usize) -> Result<CardPlan, LayoutError> {
        let limit = self.effective_card_count();
        if card_number < 1 || card_number > limit {
            return Err(LayoutError::CardIndex {
                index: card_number,
                limit,
            });
        }

        let split = self.card_split();
        let per_section = self.max_words_per_section();
        let seed_length = self.seed_length();
        let first_section = (card_number - 1) * split + 1;
        let last_section = first_section + split - 1;

        let mut sections = Vec::with_capacity(split);
        for number in first_section..=last_section {
            let first_word = (number - 1) * per_section + 1;
            if first_word > seed_length {
                break;
            }
            let last_word = (first_word + per_section - 1).min(seed_length);
            sections.push(SectionPlan {
                number,
                words: first_word..=last_word,
            });
            if last_word == seed_length {
                break;
            }
        }

        Ok(CardPlan {
            number: card_number,
            sections,
        })
    }

    /// Plans of every effective card, in card order.
    pub fn card_plans(&self) -> Result<Vec<CardPlan>, LayoutError> {
        (1..=self.effective_card_count())
            .into_par_iter()
            .map(|card| self.card_plan(card))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::params::{LayoutConfig, StencilOptions};
    use crate::types::Size;

    fn params(seed_length: usize, card_count: usize, card_split: usize) -> LayoutParameters {
        LayoutParameters::new(
            LayoutConfig::new(Size::from_mm(85.0, 54.0), card_count, seed_length).with_stencil(
                StencilOptions {
                    card_split,
                    ..StencilOptions::default()
                },
            ),
        )
        .expect("valid parameters")
    }

    fn ranges(plan: &CardPlan) -> Vec<RangeInclusive<usize>> {
        plan.sections.iter().map(|s| s.words.clone()).collect()
    }

    #[test]
    fn two_cards_split_the_seed_in_half() {
        let p = params(24, 2, 1);
        assert_eq!(ranges(&p.card_plan(1).unwrap()), vec![1..=12]);
        assert_eq!(ranges(&p.card_plan(2).unwrap()), vec![13..=24]);
    }

    #[test]
    fn last_of_five_cards_is_short() {
        let p = params(24, 5, 1);
        let expected = [1..=5, 6..=10, 11..=15, 16..=20, 21..=24];
        for (idx, range) in expected.iter().enumerate() {
            let plan = p.card_plan(idx + 1).unwrap();
            assert_eq!(plan.number, idx + 1);
            assert_eq!(ranges(&plan), vec![range.clone()]);
        }
        assert_eq!(p.card_plan(5).unwrap().word_count(), 4);
    }

    #[test]
    fn split_cards_carry_global_section_numbers() {
        let p = params(24, 2, 2);
        let card = p.card_plan(2).unwrap();
        let numbers: Vec<usize> = card.sections.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![3, 4]);
        assert_eq!(ranges(&card), vec![13..=18, 19..=24]);
        assert_eq!(card.first_word(), 13);
    }

    #[test]
    fn sections_stop_once_the_seed_is_exhausted() {
        // 5 words per section; the third section is cut short at word 13.
        let p = params(13, 1, 3);
        let card = p.card_plan(1).unwrap();
        assert_eq!(ranges(&card), vec![1..=5, 6..=10, 11..=13]);

        // 10 words, 13 cards of 2 sections: card 5 owns 9..=10 and nothing more.
        let p = params(10, 13, 2);
        assert_eq!(ranges(&p.card_plan(5).unwrap()), vec![9..=9, 10..=10]);

        // A section ending exactly on the last word must not be followed by an empty one.
        let p = params(20, 3, 2);
        assert_eq!(p.max_words_per_section(), 4);
        assert_eq!(p.effective_card_count(), 3);
        assert_eq!(ranges(&p.card_plan(3).unwrap()), vec![17..=20]);
    }

    #[test]
    fn out_of_range_cards_are_rejected() {
        let p = params(10, 13, 2);
        assert!(matches!(
            p.card_plan(0),
            Err(LayoutError::CardIndex { index: 0, limit: 5 })
        ));
        assert!(matches!(
            p.card_plan(6),
            Err(LayoutError::CardIndex { index: 6, limit: 5 })
        ));
    }

    #[test]
    fn plans_cover_the_seed_exactly_once() {
        for seed in config::SEED_LENGTH_RANGE {
            for cards in config::CARD_COUNT_RANGE {
                for split in config::CARD_SPLIT_RANGE {
                    let p = params(seed, cards, split);
                    let plans = p.card_plans().unwrap();
                    assert_eq!(plans.len(), p.effective_card_count());
                    let words: Vec<usize> = plans.iter().flat_map(|c| c.word_numbers()).collect();
                    let expected: Vec<usize> = (1..=seed).collect();
                    assert_eq!(words, expected, "seed={seed} cards={cards} split={split}");
                    for plan in &plans {
                        assert!(plan.word_count() > 0);
                        assert!(plan.sections.len() <= split);
                        assert!(plan.sections.iter().all(|s| s.word_count() > 0));
                    }
                }
            }
        }
    }

    #[test]
    fn parallel_plans_match_sequential_queries() {
        let p = params(33, 7, 3);
        let sequential: Vec<CardPlan> = (1..=p.effective_card_count())
            .map(|card| p.card_plan(card).unwrap())
            .collect();
        assert_eq!(p.card_plans().unwrap(), sequential);
    }
}
