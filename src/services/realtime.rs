// src/services/realtime.rs

use std::future::Future;

use futures_util::{stream, Stream};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Collection {
    Clients,
    Installments,
    Users,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionChange {
    pub collection: Collection,
    pub kind: ChangeKind,
}

/// Canal de notificações de escrita. Os serviços publicam depois do commit.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<CollectionChange>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, collection: Collection, kind: ChangeKind) {
        // Sem assinantes não é erro
        let receivers = self.sender.send(CollectionChange { collection, kind }).unwrap_or(0);
        tracing::debug!("📣 {:?} {:?} notificado a {} assinante(s)", collection, kind, receivers);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionChange> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

struct SnapshotState<F> {
    receiver: broadcast::Receiver<CollectionChange>,
    interested: &'static [Collection],
    load: F,
    initial: bool,
}

/// Stream de snapshots completos: o primeiro item é o estado atual, e cada
/// notificação relevante gera uma releitura inteira. Notificações acumuladas
/// são descartadas, só o estado mais recente importa.
pub fn snapshot_updates<T, F, Fut>(
    receiver: broadcast::Receiver<CollectionChange>,
    interested: &'static [Collection],
    load: F,
) -> impl Stream<Item = Result<T, AppError>>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let state = SnapshotState { receiver, interested, load, initial: true };

    stream::unfold(state, |mut state| async move {
        if state.initial {
            state.initial = false;
            let snapshot = (state.load)().await;
            return Some((snapshot, state));
        }

        loop {
            match state.receiver.recv().await {
                Ok(change) if state.interested.contains(&change.collection) => break,
                Ok(_) => continue,
                // Perdemos notificações: basta reler o estado atual
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Assinante atrasado, {} notificações descartadas", skipped);
                    break;
                }
                Err(RecvError::Closed) => return None,
            }
        }

        // Drena o que já chegou; uma releitura cobre tudo
        loop {
            match state.receiver.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        let snapshot = (state.load)().await;
        Some((snapshot, state))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;

    fn counting_loader(counter: Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<Result<usize, AppError>> {
        move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(Ok(n))
        }
    }

    #[tokio::test]
    async fn first_item_is_current_snapshot() {
        let feed = ChangeFeed::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let updates = snapshot_updates(feed.subscribe(), &[Collection::Clients], counting_loader(counter));
        tokio::pin!(updates);

        assert_eq!(updates.next().await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn relevant_change_triggers_reload() {
        let feed = ChangeFeed::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let updates = snapshot_updates(feed.subscribe(), &[Collection::Clients], counting_loader(counter));
        tokio::pin!(updates);
        updates.next().await;

        feed.publish(Collection::Clients, ChangeKind::Created);
        assert_eq!(updates.next().await.unwrap().unwrap(), 2);
    }

    #[tokio::test]
    async fn unrelated_collections_are_ignored() {
        let feed = ChangeFeed::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let updates = snapshot_updates(feed.subscribe(), &[Collection::Clients], counting_loader(counter.clone()));
        tokio::pin!(updates);
        updates.next().await;

        feed.publish(Collection::Users, ChangeKind::Updated);
        let next = tokio::time::timeout(Duration::from_millis(50), updates.next()).await;
        assert!(next.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn burst_of_changes_collapses_into_one_reload() {
        let feed = ChangeFeed::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let updates = snapshot_updates(
            feed.subscribe(),
            &[Collection::Clients, Collection::Installments],
            counting_loader(counter.clone()),
        );
        tokio::pin!(updates);
        updates.next().await;

        feed.publish(Collection::Clients, ChangeKind::Deleted);
        feed.publish(Collection::Installments, ChangeKind::Deleted);
        feed.publish(Collection::Installments, ChangeKind::Deleted);

        assert_eq!(updates.next().await.unwrap().unwrap(), 2);
        let next = tokio::time::timeout(Duration::from_millis(50), updates.next()).await;
        assert!(next.is_err());
    }

    #[tokio::test]
    async fn stream_ends_when_feed_is_dropped() {
        let feed = ChangeFeed::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let updates = snapshot_updates(feed.subscribe(), &[Collection::Clients], counting_loader(counter));
        tokio::pin!(updates);
        updates.next().await;

        drop(feed);
        assert!(updates.next().await.is_none());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let feed = ChangeFeed::new(4);
        feed.publish(Collection::Installments, ChangeKind::Created);
    }
}
