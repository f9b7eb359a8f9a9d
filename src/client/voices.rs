//! Registered-voice lookups (voice-id contract only).
//!
//! Voices are read by reference; registering or deleting them happens outside this client.

use crate::client::core::TtsClient;
use crate::contract::{check_voice_id, VoiceList, VoiceRecord};
use crate::{Error, Result};

pub(crate) const VOICES_PATH: &str = "/voices";

impl TtsClient {
    /// List voices registered with the service.
    ///
    /// When the service has no voice storage configured it answers with an empty list and a
    /// `note`; that is returned as-is.
    pub async fn list_voices(&self) -> Result<VoiceList> {
        self.require_voice_registry("list_voices")?;
        self.get_json(VOICES_PATH, "list_voices").await
    }

    /// Fetch one registered voice. Unknown ids fail with [`Error::NotFound`].
    pub async fn get_voice(&self, voice_id: &str) -> Result<VoiceRecord> {
        self.require_voice_registry("get_voice")?;
        check_voice_id(voice_id)?;
        let path = format!("{}/{}", VOICES_PATH, voice_id);
        self.get_json(&path, "get_voice").await
    }

    fn require_voice_registry(&self, operation: &str) -> Result<()> {
        if self.version.supports_voice_registry() {
            Ok(())
        } else {
            Err(Error::unsupported(format!(
                "{} requires the voice-id contract; this client speaks {}",
                operation, self.version
            )))
        }
    }
}
