//! Integration with the retrieval-augmented answer service.
//!
//! The answer service is an opaque collaborator: it takes a question plus a
//! role-labeled transcript of the recent conversation, and returns answer
//! text with cited source documents. This module defines the
//! `GenericAnswerClient` trait that can be implemented for different answer
//! backends, with a default implementation speaking JSON over HTTP.

pub mod http;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{AnswerResult, Res};

// Traits.

/// Generic answer-service trait that clients must implement.
#[async_trait]
pub trait GenericAnswerClient: Send + Sync + 'static {
    /// Ask the service a question, with the oldest-first transcript of the
    /// recent conversation as context.
    async fn answer(&self, question: &str, transcript: &[String]) -> Res<AnswerResult>;
}

// Structs.

/// Answer client for the application.
///
/// This is trivially cloneable and can be passed around without the need for
/// `Arc` or `Mutex`.
#[derive(Clone)]
pub struct AnswerClient {
    inner: Arc<dyn GenericAnswerClient>,
}

impl Deref for AnswerClient {
    type Target = dyn GenericAnswerClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl AnswerClient {
    pub fn new(inner: Arc<dyn GenericAnswerClient>) -> Self {
        Self { inner }
    }
}
