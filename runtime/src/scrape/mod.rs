//! The three scraping stages: leagues → teams → players.

pub mod leagues;
pub mod players;
pub mod teams;

pub use leagues::LeagueCollector;
pub use players::{BatchSummary, PlayerExtractor};
pub use teams::TeamCollector;

use std::future::Future;
use tracing::error;

/// Spawn one task per input and wait for all of them.
///
/// Every task runs to completion independently; a panicking task yields
/// `None` for its input and never disturbs its siblings. Concurrency is
/// bounded by the context pool the tasks acquire from, not here.
pub(crate) async fn fan_out<T, F, Fut>(inputs: Vec<String>, task: F) -> Vec<(String, Option<T>)>
where
    F: Fn(String, usize) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| {
            let handle = tokio::spawn(task(input.clone(), i + 1));
            (input, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (input, handle) in handles {
        match handle.await {
            Ok(value) => outcomes.push((input, Some(value))),
            Err(e) => {
                error!("task for {input} died: {e}");
                outcomes.push((input, None));
            }
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_isolates_panics() {
        let inputs: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let outcomes = fan_out(inputs, |input, _| async move {
            if input == "2" {
                panic!("boom");
            }
            input.len()
        })
        .await;
        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes.iter().filter(|(_, v)| v.is_none()).count(), 1);
        assert_eq!(outcomes[2].0, "2");
        assert!(outcomes[2].1.is_none());
    }
}
