//! Shared fakes for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use word_explain::transport::{GenerateRequest, TransportError, Upstream};

pub const GOOD_RESPONSE: &str = r#"{"meaning":"to examine closely","synonyms":["inspect","examine","study"],"antonyms":["ignore","overlook","skim"],"simplifiedExplanation":"look at something very carefully"}"#;

/// One scripted upstream reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Status(u16),
    Hang,
}

/// Upstream that replays a script and counts calls. Once the script runs
/// out, the fallback reply is repeated.
pub struct ScriptedUpstream {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
    delay: Duration,
}

impl ScriptedUpstream {
    pub fn new(script: Vec<Reply>, fallback: Reply) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn always(reply: Reply) -> Self {
        Self::new(Vec::new(), reply)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for ScriptedUpstream {
    async fn generate(
        &self,
        request: &GenerateRequest,
        _timeout: Duration,
    ) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Status(status) => Err(TransportError::Status {
                status,
                body: "scripted failure".to_string(),
            }),
            Reply::Hang => {
                std::future::pending::<()>().await;
                Err(TransportError::Other("unreachable".to_string()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
