use crate::http::client::HttpClient;

/// Best-effort push notification to the human operator. Implementations must
/// never fail the caller's turn: any transport problem is reported as `false`.
pub trait Notify {
    fn notify(&self, message: &str) -> impl std::future::Future<Output = bool> + Send;
}

#[derive(Debug, Clone)]
pub struct PushoverNotifier {
    http: HttpClient,
    user_key: Option<String>,
    token: Option<String>,
    url: String,
}

impl PushoverNotifier {
    pub fn new(
        http: HttpClient,
        user_key: Option<String>,
        token: Option<String>,
        url: String,
    ) -> Self {
        Self {
            http,
            user_key: user_key.filter(|v| !v.trim().is_empty()),
            token: token.filter(|v| !v.trim().is_empty()),
            url,
        }
    }
}

impl Notify for PushoverNotifier {
    async fn notify(&self, message: &str) -> bool {
        let (Some(user), Some(token)) = (&self.user_key, &self.token) else {
            eprintln!("[notify] pushover credentials not configured, dropping notification");
            return false;
        };

        let fields = [
            ("user", user.as_str()),
            ("token", token.as_str()),
            ("message", message),
        ];
        match self.http.post_form(&self.url, &fields).await {
            Ok(resp) => {
                if resp.status != 200 {
                    eprintln!("[notify] pushover rejected notification with status {}", resp.status);
                }
                resp.status == 200
            }
            Err(err) => {
                eprintln!("[notify] pushover request failed: {err}");
                false
            }
        }
    }
}

/// Test double shared by the recorder, dispatcher and orchestrator tests.
#[cfg(test)]
pub(crate) struct RecordingNotifier {
    sent: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    result: bool,
}

#[cfg(test)]
impl RecordingNotifier {
    pub(crate) fn succeeding() -> Self {
        Self::with_result(true)
    }

    pub(crate) fn failing() -> Self {
        Self::with_result(false)
    }

    fn with_result(result: bool) -> Self {
        Self {
            sent: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
            result,
        }
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.sent.lock().expect("messages lock").clone()
    }
}

#[cfg(test)]
impl Notify for RecordingNotifier {
    async fn notify(&self, message: &str) -> bool {
        self.sent.lock().expect("messages lock").push(message.to_string());
        self.result
    }
}
