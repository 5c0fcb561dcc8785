//! Integration tests for ai_speech crate
//!
//! Exercises the Azure provider against a mocked speech service.

use std::time::Duration;

use ai_speech::audio::wav;
use ai_speech::{
    AzureSpeechProvider, CancellationErrorCode, NoMatchReason, PcmBuffer, RecognitionPayload,
    RecognitionOutputFormat, ResultReason, SpeechOptions, SpeechRecognizer, SpeechSynthesizer,
    SynthesisOutputFormat, WavFileSource, build_speech_config,
};
use ai_speech::ports::AudioSource;
use secrecy::SecretString;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STT_PATH: &str = "/speech/recognition/conversation/cognitiveservices/v1";
const TTS_PATH: &str = "/cognitiveservices/v1";

/// Options pointing both services at the mock server
fn test_options(base_url: &str) -> SpeechOptions {
    let mut options = SpeechOptions::new(SecretString::from("test-key"), "westeurope");
    options.stt_endpoint = Some(base_url.to_string());
    options.tts_endpoint = Some(base_url.to_string());
    options.timeout_ms = 5000;
    options
}

fn provider(base_url: &str) -> AzureSpeechProvider {
    let config = build_speech_config(test_options(base_url)).expect("valid config");
    AzureSpeechProvider::new(config).expect("Failed to create provider")
}

/// 100 ms of a quiet tone at 16 kHz
fn utterance() -> PcmBuffer {
    let samples = (0..1600).map(|i| ((i % 40) * 50) as i16).collect();
    PcmBuffer::new(samples, 16_000)
}

fn detailed_success() -> serde_json::Value {
    serde_json::json!({
        "RecognitionStatus": "Success",
        "Offset": 1_800_000,
        "Duration": 12_300_000,
        "DisplayText": "What's the weather like?",
        "NBest": [
            {
                "Confidence": 0.97,
                "Lexical": "what's the weather like",
                "ITN": "what's the weather like",
                "MaskedITN": "what's the weather like",
                "Display": "What's the weather like?"
            },
            {
                "Confidence": 0.62,
                "Lexical": "what's the whether like",
                "ITN": "what's the whether like",
                "MaskedITN": "what's the whether like",
                "Display": "What's the whether like?"
            }
        ]
    })
}

// ============ Recognition ============

#[tokio::test]
async fn recognition_success_keeps_nbest_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STT_PATH))
        .and(query_param("language", "en-US"))
        .and(query_param("format", "detailed"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .and(header(
            "Content-Type",
            "audio/wav; codecs=audio/pcm; samplerate=16000",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(detailed_success()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server.uri())
        .recognize_once(utterance())
        .await
        .unwrap();

    assert_eq!(result.reason, ResultReason::RecognizedSpeech);
    assert_eq!(result.text.as_deref(), Some("What's the weather like?"));

    let payload = RecognitionPayload::from_json(result.json.as_deref().unwrap()).unwrap();
    let nbest = payload.nbest.unwrap();
    assert_eq!(nbest.len(), 2);
    assert!((nbest[0].confidence - 0.97).abs() < f64::EPSILON);
    assert_eq!(nbest[1].display, "What's the whether like?");
}

#[tokio::test]
async fn recognition_simple_format_has_no_alternatives() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STT_PATH))
        .and(query_param("format", "simple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "RecognitionStatus": "Success",
            "DisplayText": "Hello.",
            "Offset": 0,
            "Duration": 9_000_000
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut options = test_options(&mock_server.uri());
    options.recognition_format = RecognitionOutputFormat::Simple;
    let provider = AzureSpeechProvider::new(build_speech_config(options).unwrap()).unwrap();

    let result = provider.recognize_once(utterance()).await.unwrap();

    assert_eq!(result.text.as_deref(), Some("Hello."));
    let payload = RecognitionPayload::from_json(result.json.as_deref().unwrap()).unwrap();
    assert!(payload.nbest.is_none());
}

#[tokio::test]
async fn recognition_resamples_to_16khz() {
    let mock_server = MockServer::start().await;

    // 48 kHz input of 4800 samples becomes 1600 samples at 16 kHz
    let expected_body = wav::encode(&PcmBuffer::new(vec![0; 1600], 16_000));

    Mock::given(method("POST"))
        .and(path(STT_PATH))
        .and(wiremock::matchers::body_bytes(expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "RecognitionStatus": "NoMatch"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server.uri())
        .recognize_once(PcmBuffer::new(vec![0; 4800], 48_000))
        .await
        .unwrap();

    assert_eq!(result.reason, ResultReason::NoMatch);
    assert_eq!(result.no_match_reason, Some(NoMatchReason::NotRecognized));
}

#[tokio::test]
async fn recognition_silence_is_no_match() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "RecognitionStatus": "InitialSilenceTimeout",
            "Offset": 50_000_000,
            "Duration": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server.uri())
        .recognize_once(utterance())
        .await
        .unwrap();

    assert_eq!(result.reason, ResultReason::NoMatch);
    assert_eq!(
        result.no_match_reason,
        Some(NoMatchReason::InitialSilenceTimeout)
    );
    assert!(result.text.is_none());
}

#[tokio::test]
async fn recognition_bad_key_is_canceled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STT_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Access denied due to invalid subscription key"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server.uri())
        .recognize_once(utterance())
        .await
        .unwrap();

    assert_eq!(result.reason, ResultReason::Canceled);
    let details = result.cancellation.unwrap();
    assert_eq!(
        details.error_code,
        CancellationErrorCode::AuthenticationFailure
    );
    assert!(details.error_details.contains("invalid subscription key"));
}

#[tokio::test]
async fn recognition_unreachable_service_is_canceled() {
    // Nothing listens on port 1
    let result = provider("http://127.0.0.1:1")
        .recognize_once(utterance())
        .await
        .unwrap();

    assert_eq!(result.reason, ResultReason::Canceled);
    assert_eq!(
        result.cancellation.unwrap().error_code,
        CancellationErrorCode::ConnectionFailure
    );
}

#[tokio::test]
async fn recognition_slow_service_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(detailed_success())
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&mock_server)
        .await;

    let mut options = test_options(&mock_server.uri());
    options.timeout_ms = 200;
    let provider = AzureSpeechProvider::new(build_speech_config(options).unwrap()).unwrap();

    let result = provider.recognize_once(utterance()).await.unwrap();

    assert_eq!(result.reason, ResultReason::Canceled);
    assert_eq!(
        result.cancellation.unwrap().error_code,
        CancellationErrorCode::ServiceTimeout
    );
}

#[tokio::test]
async fn recognition_from_wav_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(detailed_success()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let wav_path = dir.path().join("question.wav");
    std::fs::write(&wav_path, wav::encode(&utterance())).unwrap();

    let audio = WavFileSource::new(&wav_path).capture().await.unwrap();
    let result = provider(&mock_server.uri())
        .recognize_once(audio)
        .await
        .unwrap();

    assert_eq!(result.reason, ResultReason::RecognizedSpeech);
}

// ============ Synthesis ============

const SSML: &str = r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="en-US"><voice name="en-US-DavisNeural">Hello.</voice></speak>"#;

#[tokio::test]
async fn synthesis_success_returns_audio() {
    let mock_server = MockServer::start().await;
    let mp3 = vec![0xFF, 0xFB, 0x90, 0x00, 0x00, 0x00];

    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .and(header("Content-Type", "application/ssml+xml"))
        .and(header(
            "X-Microsoft-OutputFormat",
            "audio-16khz-32kbitrate-mono-mp3",
        ))
        .and(body_string(SSML))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(mp3.clone())
                .insert_header("content-type", "audio/mpeg"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server.uri())
        .synthesize_ssml(SSML, SynthesisOutputFormat::Audio16Khz32KBitRateMonoMp3)
        .await
        .unwrap();

    assert_eq!(result.reason, ResultReason::SynthesizingAudioCompleted);
    let audio = result.audio.unwrap();
    assert_eq!(audio.data(), mp3.as_slice());
    assert_eq!(
        audio.format(),
        SynthesisOutputFormat::Audio16Khz32KBitRateMonoMp3
    );
}

#[tokio::test]
async fn synthesis_malformed_ssml_is_canceled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("SSML parsing error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server.uri())
        .synthesize_ssml("<speak>", SynthesisOutputFormat::Raw16Khz16BitMonoPcm)
        .await
        .unwrap();

    assert_eq!(result.reason, ResultReason::Canceled);
    assert!(result.audio.is_none());
    let details = result.cancellation.unwrap();
    assert_eq!(details.error_code, CancellationErrorCode::BadRequest);
    assert!(details.error_details.contains("SSML parsing error"));
}

#[tokio::test]
async fn synthesis_throttled_is_canceled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server.uri())
        .synthesize_ssml(SSML, SynthesisOutputFormat::Raw16Khz16BitMonoPcm)
        .await
        .unwrap();

    assert_eq!(
        result.cancellation.unwrap().error_code,
        CancellationErrorCode::TooManyRequests
    );
}

#[tokio::test]
async fn synthesis_empty_body_is_canceled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server.uri())
        .synthesize_ssml(SSML, SynthesisOutputFormat::Raw16Khz16BitMonoPcm)
        .await
        .unwrap();

    assert_eq!(result.reason, ResultReason::Canceled);
    assert_eq!(
        result.cancellation.unwrap().error_code,
        CancellationErrorCode::ServiceError
    );
}

// ============ Voices ============

#[tokio::test]
async fn list_voices_parses_service_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cognitiveservices/voices/list"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "Name": "Microsoft Server Speech Text to Speech Voice (en-US, DavisNeural)",
                "DisplayName": "Davis",
                "ShortName": "en-US-DavisNeural",
                "Gender": "Male",
                "Locale": "en-US",
                "VoiceType": "Neural"
            },
            {
                "DisplayName": "Katja",
                "ShortName": "de-DE-KatjaNeural",
                "Gender": "Female",
                "Locale": "de-DE"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let voices = provider(&mock_server.uri()).list_voices().await.unwrap();

    assert_eq!(voices.len(), 2);
    assert_eq!(voices[0].short_name, "en-US-DavisNeural");
    assert_eq!(voices[1].locale, "de-DE");
}

#[tokio::test]
async fn list_voices_reports_http_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cognitiveservices/voices/list"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server.uri())
        .list_voices()
        .await
        .unwrap_err();

    assert!(matches!(err, ai_speech::SpeechError::RequestFailed(_)));
}

#[tokio::test]
async fn list_voices_timeout_reports_configured_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cognitiveservices/voices/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&mock_server)
        .await;

    let mut options = test_options(&mock_server.uri());
    options.timeout_ms = 250;
    let provider = AzureSpeechProvider::new(build_speech_config(options).unwrap()).unwrap();

    let err = provider.list_voices().await.unwrap_err();

    assert!(matches!(err, ai_speech::SpeechError::Timeout(250)));
}
