use std::sync::Arc;

use tokio::sync::watch;

use crate::models::{GitHubConnection, RepoSelection};

/// A unit of shared reactive state. Clones are handles to the same value;
/// subscribers are woken only when the value actually changes.
#[derive(Debug)]
pub struct Atom<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Atom<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> Atom<T>
where
    T: Clone + PartialEq,
{
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn set(&self, value: T) {
        self.tx.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.tx.send_if_modified(|current| {
            let before = current.clone();
            f(current);
            *current != before
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T> Atom<T>
where
    T: Clone + PartialEq + Default,
{
    pub fn reset(&self) {
        self.set(T::default());
    }
}

impl<T> Default for Atom<T>
where
    T: Clone + PartialEq + Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// State shared by every header created from the same set of atoms.
#[derive(Debug, Clone, Default)]
pub struct AppAtoms {
    pub github_connection: Atom<GitHubConnection>,
    pub selection: Atom<RepoSelection>,
}
