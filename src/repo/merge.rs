use tokio::sync::mpsc::UnboundedReceiver;

/// Fan-in of one result channel and one error channel.
///
/// Returns once both channels are closed, i.e. every producer holding a sender is gone.
/// A closed channel is no longer polled.
pub async fn drain<T, E, R, F>(
    mut results: UnboundedReceiver<T>,
    mut errors: UnboundedReceiver<E>,
    mut on_result: R,
    mut on_error: F,
) where
    R: FnMut(T),
    F: FnMut(E),
{
    let mut results_open = true;
    let mut errors_open = true;
    while results_open || errors_open {
        tokio::select! {
            res = results.recv(), if results_open => match res {
                Some(res) => on_result(res),
                None => results_open = false,
            },
            err = errors.recv(), if errors_open => match err {
                Some(err) => on_error(err),
                None => errors_open = false,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn test_drain_until_all_producers_finish() {
        let (res_tx, res_rx) = unbounded_channel();
        let (err_tx, err_rx) = unbounded_channel();

        let mut handles = Vec::new();
        for i in 0..8u32 {
            let res_tx = res_tx.clone();
            let err_tx = err_tx.clone();
            handles.push(tokio::spawn(async move {
                tokio::task::yield_now().await;
                if i % 3 == 0 {
                    err_tx.send(format!("producer {} failed", i)).unwrap();
                } else {
                    res_tx.send(i).unwrap();
                }
            }));
        }
        drop(res_tx);
        drop(err_tx);

        let mut results = Vec::new();
        let mut errors = Vec::new();
        drain(res_rx, err_rx, |r| results.push(r), |e| errors.push(e)).await;

        results.sort_unstable();
        assert_eq!(results, vec![1, 2, 4, 5, 7]);
        assert_eq!(errors.len(), 3);
        for h in handles {
            h.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_drain_closed_channels() {
        let (res_tx, res_rx) = unbounded_channel::<u8>();
        let (err_tx, err_rx) = unbounded_channel::<u8>();
        drop(res_tx);
        drop(err_tx);
        let mut results = 0;
        let mut errors = 0;
        drain(res_rx, err_rx, |_| results += 1, |_| errors += 1).await;
        assert_eq!((results, errors), (0, 0));
    }
}
