use rand::{rng, seq::SliceRandom};

use crate::dao::models::QuestionEntity;

/// Fixed pool of question/answer pairs games draw from.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pool: Vec<QuestionEntity>,
}

impl QuestionBank {
    /// Bank over a fixed pool.
    pub fn new(pool: Vec<QuestionEntity>) -> Self {
        Self { pool }
    }

    /// Pool size.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether the pool holds no question.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Draw `min(count, len)` distinct questions in random order.
    pub fn sample(&self, count: usize) -> Vec<QuestionEntity> {
        let mut drawn = self.pool.clone();
        drawn.shuffle(&mut rng());
        drawn.truncate(count);
        drawn
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn bank(size: usize) -> QuestionBank {
        QuestionBank::new(
            (0..size)
                .map(|i| QuestionEntity {
                    id: i.to_string(),
                    question: format!("Q{i}"),
                    answer: format!("A{i}"),
                })
                .collect(),
        )
    }

    #[test]
    fn sample_returns_distinct_questions() {
        let drawn = bank(20).sample(10);
        assert_eq!(drawn.len(), 10);
        let ids: HashSet<_> = drawn.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn sample_is_capped_by_pool_size() {
        let drawn = bank(4).sample(10);
        assert_eq!(drawn.len(), 4);
        assert!(bank(0).sample(10).is_empty());
    }
}
