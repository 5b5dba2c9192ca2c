//! FIFO replay buffer.
use super::{ReplayBufferConfig, StdBatch, Transition};
use crate::{error::BlobDqnError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use rand::{rngs::StdRng, seq::index, SeedableRng};
use std::collections::{vec_deque::Iter, VecDeque};

/// A capacity-bounded replay buffer.
///
/// When full, pushing a transition evicts the oldest one. Batches are drawn
/// uniformly at random without replacement.
pub struct ReplayBuffer<O, A> {
    capacity: usize,
    buf: VecDeque<Transition<O, A>>,
    rng: StdRng,
}

impl<O, A> ReplayBuffer<O, A> {
    /// Returns the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over the stored transitions from the oldest to the newest.
    pub fn iter(&self) -> Iter<'_, Transition<O, A>> {
        self.buf.iter()
    }
}

impl<O, A> ExperienceBufferBase for ReplayBuffer<O, A> {
    type Item = Transition<O, A>;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(tr);
        Ok(())
    }

    fn len(&self) -> usize {
        self.buf.len()
    }
}

impl<O: Clone, A: Clone> ReplayBufferBase for ReplayBuffer<O, A> {
    type Config = ReplayBufferConfig;
    type Batch = StdBatch<O, A>;

    fn build(config: &Self::Config) -> Self {
        Self {
            capacity: config.capacity,
            buf: VecDeque::with_capacity(config.capacity),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        let len = self.buf.len();
        if len < size {
            return Err(BlobDqnError::InsufficientTransitions {
                len,
                batch_size: size,
            }
            .into());
        }

        let mut batch = StdBatch::with_capacity(size);
        for ix in index::sample(&mut self.rng, len, size).into_iter() {
            batch.push(&self.buf[ix]);
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::TransitionBatch;
    use std::collections::HashSet;

    fn transition(tag: usize) -> Transition<usize, usize> {
        Transition {
            obs: tag,
            act: tag % 3,
            next_obs: tag + 1,
            reward: tag as f32,
            is_terminated: false,
            is_truncated: false,
        }
    }

    fn buffer(capacity: usize) -> ReplayBuffer<usize, usize> {
        ReplayBuffer::build(&ReplayBufferConfig::default().capacity(capacity))
    }

    #[test]
    fn test_fifo_eviction() -> Result<()> {
        let mut buffer = buffer(5);
        for tag in 1..=7 {
            buffer.push(transition(tag))?;
            assert!(buffer.len() <= 5);
        }

        let tags: Vec<_> = buffer.iter().map(|tr| tr.obs).collect();
        assert_eq!(tags, vec![3, 4, 5, 6, 7]);
        Ok(())
    }

    #[test]
    fn test_size_bounded_for_various_capacities() -> Result<()> {
        for capacity in [1, 2, 10, 33] {
            let mut buffer = buffer(capacity);
            for k in 0..capacity + 17 {
                buffer.push(transition(k))?;
                assert_eq!(buffer.len(), (k + 1).min(capacity));
            }
            let tags: Vec<_> = buffer.iter().map(|tr| tr.obs).collect();
            let expected: Vec<_> = (17..capacity + 17).collect();
            assert_eq!(tags, expected);
        }
        Ok(())
    }

    #[test]
    fn test_batch_members_are_distinct_and_present() -> Result<()> {
        let mut buffer = buffer(20);
        for tag in 0..30 {
            buffer.push(transition(tag))?;
        }
        let present: HashSet<_> = buffer.iter().map(|tr| tr.obs).collect();

        for _ in 0..100 {
            let batch = buffer.batch(8)?;
            assert_eq!(batch.len(), 8);
            let (obs, act, next_obs, reward, _, _) = batch.unpack();
            let sampled: HashSet<_> = obs.iter().cloned().collect();
            assert_eq!(sampled.len(), 8);
            assert!(sampled.is_subset(&present));
            for i in 0..8 {
                assert_eq!(act[i], obs[i] % 3);
                assert_eq!(next_obs[i], obs[i] + 1);
                assert_eq!(reward[i], obs[i] as f32);
            }
        }
        Ok(())
    }

    #[test]
    fn test_sampling_covers_uniformly() -> Result<()> {
        let mut buffer = buffer(10);
        for tag in 0..10 {
            buffer.push(transition(tag))?;
        }

        let mut counts = [0usize; 10];
        let n_draws = 5000;
        for _ in 0..n_draws {
            for tag in buffer.batch(2)?.obs {
                counts[tag] += 1;
            }
        }

        // Each member is expected 1000 times.
        for c in counts.iter() {
            assert!(*c > 850 && *c < 1150, "{:?}", counts);
        }
        Ok(())
    }

    #[test]
    fn test_batch_larger_than_buffer_fails() -> Result<()> {
        let mut buffer = buffer(10);
        for tag in 0..3 {
            buffer.push(transition(tag))?;
        }
        let err = buffer.batch(4).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<BlobDqnError>(),
            Some(BlobDqnError::InsufficientTransitions {
                len: 3,
                batch_size: 4
            })
        ));
        Ok(())
    }
}
