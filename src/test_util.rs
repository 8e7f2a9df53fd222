use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::providers::{Provider, ProviderFuture, ProviderUsage, TranslationUnit};

/// Dictionary-backed provider. Unknown texts come back unchanged; every call
/// is recorded.
#[derive(Clone)]
pub(crate) struct StubProvider {
    dictionary: Arc<HashMap<String, String>>,
    calls: Arc<Mutex<Vec<TranslationUnit>>>,
    usage_calls: Arc<AtomicUsize>,
    usage: ProviderUsage,
    fail: bool,
}

impl StubProvider {
    pub(crate) fn new(pairs: &[(&str, &str)]) -> Self {
        let dictionary = pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self {
            dictionary: Arc::new(dictionary),
            calls: Arc::new(Mutex::new(Vec::new())),
            usage_calls: Arc::new(AtomicUsize::new(0)),
            usage: ProviderUsage {
                character_count: 0,
                character_limit: 500_000,
            },
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub(crate) fn with_usage(mut self, count: u64, limit: u64) -> Self {
        self.usage = ProviderUsage {
            character_count: count,
            character_limit: limit,
        };
        self
    }

    pub(crate) fn calls(&self) -> Vec<TranslationUnit> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn usage_calls(&self) -> usize {
        self.usage_calls.load(Ordering::SeqCst)
    }
}

impl Provider for StubProvider {
    fn translate(&self, unit: TranslationUnit) -> ProviderFuture<Vec<String>> {
        self.calls.lock().expect("calls lock").push(unit.clone());
        let fail = self.fail;
        let translated = unit
            .texts
            .iter()
            .map(|text| self.dictionary.get(text).cloned().unwrap_or_else(|| text.clone()))
            .collect::<Vec<_>>();
        Box::pin(async move {
            if fail {
                return Err(anyhow!("stub provider unavailable"));
            }
            Ok(translated)
        })
    }

    fn usage(&self) -> ProviderFuture<ProviderUsage> {
        self.usage_calls.fetch_add(1, Ordering::SeqCst);
        let usage = self.usage;
        Box::pin(async move { Ok(usage) })
    }
}
