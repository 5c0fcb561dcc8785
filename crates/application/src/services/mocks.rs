//! Port mocks shared by the service tests

use ai_speech::{
    AudioData, AudioPlayer, AudioSource, PcmBuffer, RecognitionResult, SpeechError,
    SpeechRecognizer, SpeechSynthesizer, SynthesisOutputFormat, SynthesisResult, VoiceInfo,
};
use async_trait::async_trait;
use mockall::mock;

mock! {
    pub Recognizer {}

    #[async_trait]
    impl SpeechRecognizer for Recognizer {
        async fn recognize_once(&self, audio: PcmBuffer) -> Result<RecognitionResult, SpeechError>;
    }
}

mock! {
    pub Synthesizer {}

    #[async_trait]
    impl SpeechSynthesizer for Synthesizer {
        async fn synthesize_ssml(
            &self,
            ssml: &str,
            format: SynthesisOutputFormat,
        ) -> Result<SynthesisResult, SpeechError>;

        async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError>;
    }
}

mock! {
    pub Source {}

    #[async_trait]
    impl AudioSource for Source {
        fn prompt(&self) -> String;
        async fn capture(&self) -> Result<PcmBuffer, SpeechError>;
    }
}

mock! {
    pub Player {}

    #[async_trait]
    impl AudioPlayer for Player {
        fn check_available(&self) -> Result<(), SpeechError>;
        async fn play(&self, audio: &AudioData) -> Result<(), SpeechError>;
    }
}

/// Source that yields one short utterance
pub fn utterance_source() -> MockSource {
    let mut source = MockSource::new();
    source
        .expect_prompt()
        .returning(|| "🎙️ Speak into your microphone...".to_string());
    source
        .expect_capture()
        .returning(|| Ok(PcmBuffer::new(vec![100; 1600], 16_000)));
    source
}
