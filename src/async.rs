//! Async utilities.

use std::future::Future;

use itertools::Itertools;
use tokio::task::JoinSet;

use crate::error::LogErr;

/// try_map spawns a future for each item in the iterator and waits for all of them to complete.
/// If any of the futures return an error, try_map will return that error.
/// The futures are spawned in chunks of 50. Output keeps the input order.
pub async fn try_map<T, I, F, O, Fut>(input: I, f: F) -> Result<Vec<O>, LogErr>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut + Send + 'static,
    Fut: Future<Output = Result<O, LogErr>> + Send + 'static,
    T: Send + 'static,
    O: Send + 'static,
{
    let iterator = input.into_iter();
    let (lower_bound, _) = iterator.size_hint();
    let mut output = Vec::with_capacity(lower_bound);

    for chunk in &iterator.chunks(50) {
        let mut set = JoinSet::new();
        let base = output.len();
        for (index, item) in chunk.enumerate() {
            let fut = f(item);
            set.spawn(async move { (base + index, fut.await) });
        }

        let mut results = Vec::with_capacity(set.len());
        while let Some(res) = set.join_next().await {
            let (index, result) = res?;
            results.push((index, result?));
        }
        results.sort_by_key(|(index, _)| *index);
        output.extend(results.into_iter().map(|(_, val)| val));
    }

    Ok(output)
}
