//! Test doubles with call counters

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::embedding::Embedder;
use crate::llm::GenerativeModel;
use crate::storage::{Candidate, FaqStore, SimilarityIndex};
use crate::{Error, Result};

pub struct MockStore {
    answer: Option<String>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockStore {
    pub fn empty() -> Self {
        Self {
            answer: None,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_answer(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            ..Self::empty()
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            failure: Some(detail.to_string()),
            ..Self::empty()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FaqStore for MockStore {
    fn lookup(&self, _normalized_question: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(detail) => Err(Error::StoreAccess(detail.clone())),
            None => Ok(self.answer.clone()),
        }
    }
}

pub struct MockIndex {
    candidate: Option<Candidate>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockIndex {
    pub fn empty() -> Self {
        Self {
            candidate: None,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_match(score: f32, question: &str, answer: &str) -> Self {
        Self {
            candidate: Some(Candidate {
                score,
                question: question.to_string(),
                answer: answer.to_string(),
            }),
            ..Self::empty()
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            failure: Some(detail.to_string()),
            ..Self::empty()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SimilarityIndex for MockIndex {
    fn nearest(&self, _vector: &[f32]) -> Result<Option<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(detail) => Err(Error::IndexAccess(detail.clone())),
            None => Ok(self.candidate.clone()),
        }
    }
}

pub struct MockEmbedder {
    fail: bool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Embedding("model not loaded".to_string()));
        }
        Ok(vec![1.0, 0.0, 0.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        4
    }
}

pub struct MockModel {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            reply: Err(detail.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl GenerativeModel for MockModel {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.reply.clone().map_err(Error::Generative)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
