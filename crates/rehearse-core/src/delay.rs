use std::time::Duration;

use rand::Rng;

/// Artificial "thinking" pause before the virtual client answers.
///
/// Purely cosmetic: it never affects which reply is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDelay {
    None,
    Fixed(Duration),
    /// Uniformly random within `[min, max]`
    Random { min: Duration, max: Duration },
}

impl Default for ReplyDelay {
    fn default() -> Self {
        ReplyDelay::Random {
            min: Duration::from_millis(1500),
            max: Duration::from_millis(3000),
        }
    }
}

impl ReplyDelay {
    /// Build from millisecond bounds; equal bounds give a fixed delay.
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        let (min_ms, max_ms) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };

        match (min_ms, max_ms) {
            (0, 0) => ReplyDelay::None,
            (min, max) if min == max => ReplyDelay::Fixed(Duration::from_millis(min)),
            (min, max) => ReplyDelay::Random {
                min: Duration::from_millis(min),
                max: Duration::from_millis(max),
            },
        }
    }

    pub fn sample(&self) -> Duration {
        match *self {
            ReplyDelay::None => Duration::ZERO,
            ReplyDelay::Fixed(delay) => delay,
            ReplyDelay::Random { min, max } => {
                let ms = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
                Duration::from_millis(ms as u64)
            }
        }
    }
}
