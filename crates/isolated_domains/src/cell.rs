// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod storage;

use std::{
    ops::Deref,
    pin::Pin,
    sync::{Arc, RwLock},
};

use crate::{Domain, Transfer, TransferFnOnce, closure::ErasedClosureOnce, closure_once};
use storage::Storage;

/// Transferable reference counted type.
///
/// This type works like `Arc`, but it allows transferring the data between different domains.
/// Each domain gets its own copy of the data, and the data is not shared between domains.
///
/// # Clone behavior
/// Cloning a `Trc<T>` will behave like `Arc<T>`, meaning it will create a new reference to the same data.
///
/// # Transfer behavior
/// When transferring a `Trc<T>` from one domain to another, it will check if the data already exists in the destination domain.
/// If it does, it will use the existing data otherwise it will recreate the data using the stored factory closure or clone of the data.
#[derive(Debug, Clone)]
pub struct Trc<T> {
    storage: Arc<RwLock<Storage<Arc<T>>>>,
    data: Arc<T>,
    factory: Factory<T>,
}

type DataFn<T> = fn(&T, Domain, Domain) -> Pin<Box<dyn Future<Output = T>>>;

#[derive(Debug, Clone)]
enum Factory<T> {
    /// An external closure was provided to create the data.
    Closure(Arc<ErasedClosureOnce<T>>),

    /// An external closure was provided to create the data.
    AsyncClosure(Arc<ErasedClosureOnce<Pin<Box<dyn Future<Output = T>>>>>),

    /// The data is Transfer + Clone and will be cloned and transferred.
    Data(DataFn<T>),
}

impl<T> Deref for Trc<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> Trc<T>
where
    T: Transfer + Clone + 'static,
{
    /// Creates a new `Trc` with the given value.
    /// The value must implement `Transfer` and `Clone`.
    pub fn new(value: T) -> Self {
        let data = Arc::new(value);

        Self {
            storage: Arc::new(RwLock::new(storage::Storage::new())),
            data,
            factory: Factory::Data(|data: &T, source, destination| {
                let data = data.clone();
                Box::pin(async move { data.transfer(source, destination).await })
            }),
        }
    }
}

impl<T> Trc<T>
where
    T: 'static,
{
    /// Creates a new `Trc` with a closure that will be called once to create the data.
    ///
    /// # Notes on transferring
    /// Clones of this closure will be transferred between domains and might be called with different source domains,
    /// the original will never be transferred.
    pub fn with_closure<F>(closure: F) -> Self
    where
        F: TransferFnOnce<T> + Clone + Transfer + 'static,
    {
        let data = Arc::new(closure.clone().call_once());

        Self {
            storage: Arc::new(RwLock::new(storage::Storage::new())),
            data,
            factory: Factory::Closure(Arc::new(ErasedClosureOnce::new(closure))),
        }
    }

    /// Creates a new `Trc` with a closure that will be called once to create the data.
    ///
    /// # Notes on transferring
    /// Clones of this closure will be transferred between domains and might be called with different source domains,
    /// the original will never be transferred.
    pub async fn with_async_closure<F, X>(closure: F) -> Self
    where
        X: Future<Output = T> + 'static,
        F: TransferFnOnce<X> + Clone + Transfer + 'static,
    {
        let data = Arc::new(closure.clone().call_once().await);

        let closure = closure_once(closure, |closure| -> Pin<Box<dyn Future<Output = T>>> {
            Box::pin(async move { closure.call_once().await })
        });

        Self {
            storage: Arc::new(RwLock::new(storage::Storage::new())),
            data,
            factory: Factory::AsyncClosure(Arc::new(ErasedClosureOnce::new(closure))),
        }
    }
}

impl<T> Trc<T> {
    /// Converts the `Trc<T>` into an `Arc<T>`.
    #[must_use]
    pub fn into_arc(self) -> Arc<T> {
        self.data
    }
}

impl<T> Transfer for Trc<T> {
    async fn transfer(self, source: Domain, destination: Domain) -> Self {
        // let mut write = self.storage.write().expect("Failed to acquire write lock");

        let data = self
            .storage
            .read()
            .expect("Failed to acquire read lock")
            .get_clone(destination);

        let data = if let Some(data) = data {
            data
        } else {
            // We need to transfer or recreate the data
            let data = match &self.factory {
                // We can use the closure to create new data
                Factory::Closure(factory) => {
                    let factory = (**factory).clone();
                    factory.transfer(source, destination).await.call_once()
                }

                Factory::AsyncClosure(factory) => {
                    let factory = (**factory).clone();
                    factory
                        .transfer(source, destination)
                        .await
                        .call_once()
                        .await
                }

                // We can clone and transfer the data
                Factory::Data(factory) => factory(&self.data, source, destination).await,
            };

            let data = Arc::new(data);

            let old_data = self
                .storage
                .write()
                .expect("Failed to acquire write lock")
                .replace(destination, Arc::<T>::clone(&data));

            assert!(
                old_data.is_none(),
                "Data already exists for the destination domain"
            );

            data
        };

        self.storage
            .write()
            .expect("Failed to acquire write lock")
            .replace(source, self.data);

        Self {
            storage: self.storage,
            data,
            factory: self.factory,
        }
    }
}
