use llm_moves::{
    ActionResolver, MoveVocabulary, ResolutionSource, ResolverConfig, SamplingConfig,
    TemplatePromptBuilder,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

mod common;
use common::StubClient;

#[ctor::ctor]
fn _init() { common::init(); }

const SEED: u64 = 42;

fn resolver<'a>(client: &'a StubClient, config: ResolverConfig) -> ActionResolver<&'a StubClient> {
    let vocab = Arc::new(MoveVocabulary::cardinal());
    let prompts = TemplatePromptBuilder::new(&vocab);
    ActionResolver::new(client, prompts, vocab, config, StdRng::seed_from_u64(SEED))
}

/// The key the seeded random source would pick first.
fn expected_random_pick() -> String {
    let vocab = MoveVocabulary::cardinal();
    let idx = StdRng::seed_from_u64(SEED).gen_range(0..vocab.len());
    vocab.keys().nth(idx).unwrap().to_string()
}

#[test]
fn bypass_never_calls_model() {
    let client = StubClient::new(["UP"]);
    let mut r = resolver(&client, ResolverConfig::offline());
    let vocab = MoveVocabulary::cardinal();
    for ctx in ["", "wall ahead", "a very long description\nwith lines"] {
        let sampling = SamplingConfig { temperature: 9.0, max_tokens: 0, ..SamplingConfig::new() };
        let action = r.resolve(ctx, &sampling).unwrap();
        assert!(vocab.contains(&action), "{action} not a legal move");
    }
    assert_eq!(client.call_count(), 0);
}

#[test]
fn bypass_pick_is_deterministic_with_seed() {
    let client = StubClient::new(Vec::<String>::new());
    let res = resolver(&client, ResolverConfig::offline())
        .resolve_detailed("ctx", &SamplingConfig::new())
        .unwrap();
    assert_eq!(res.source, ResolutionSource::Bypass);
    assert_eq!(res.model_calls, 0);
    assert_eq!(res.action, expected_random_pick());
}

#[test]
fn happy_path_single_call() {
    let client = StubClient::new(["RIGHT"]);
    let action = resolver(&client, ResolverConfig::new())
        .resolve("enemy on the left", &SamplingConfig::new())
        .unwrap();
    assert_eq!(action, "RIGHT");
    assert_eq!(client.call_count(), 1);
    assert!(client.user_prompt(0).contains("enemy on the left"));
}

#[test]
fn one_shot_recovery() {
    let client = StubClient::new(["move up please", "UP"]);
    let res = resolver(&client, ResolverConfig::new())
        .resolve_detailed("ctx", &SamplingConfig::new())
        .unwrap();
    assert_eq!(res.action, "UP");
    assert_eq!(res.source, ResolutionSource::Corrected);
    assert_eq!(client.call_count(), 2);

    let first = client.user_prompt(0);
    let second = client.user_prompt(1);
    assert_ne!(first, second);
    assert!(second.contains("move up please"));
    assert!(!first.contains("move up please"));
}

#[test]
fn retry_uses_identical_sampling() {
    let client = StubClient::new(["?", "DOWN"]);
    let sampling = SamplingConfig {
        temperature: 0.7,
        max_tokens: 5,
        top_p: 0.9,
        ..SamplingConfig::new()
    };
    resolver(&client, ResolverConfig::new()).resolve("ctx", &sampling).unwrap();
    assert_eq!(client.sampling(0), sampling);
    assert_eq!(client.sampling(1), sampling);
}

#[test]
fn exhausted_retries_fall_back() {
    let client = StubClient::new(["jump", "fly", "UP"]);
    let res = resolver(&client, ResolverConfig::new())
        .resolve_detailed("ctx", &SamplingConfig::new())
        .unwrap();
    assert_eq!(res.source, ResolutionSource::Fallback);
    assert!(res.is_random());
    assert!(MoveVocabulary::cardinal().contains(&res.action));
    assert_eq!(res.action, expected_random_pick());
    assert_eq!(res.rejected, vec!["jump".to_string(), "fly".to_string()]);
    assert_eq!(client.call_count(), 2);
}

#[test]
fn whitespace_is_trimmed() {
    for answer in ["  LEFT", "LEFT\n", "\n\t LEFT \r\n"] {
        let client = StubClient::new([answer]);
        let action = resolver(&client, ResolverConfig::new())
            .resolve("ctx", &SamplingConfig::new())
            .unwrap();
        assert_eq!(action, "LEFT");
        assert_eq!(client.call_count(), 1);
    }
}

#[test]
fn case_mismatch_is_invalid() {
    let client = StubClient::new(["left", "Left"]);
    let res = resolver(&client, ResolverConfig::new())
        .resolve_detailed("ctx", &SamplingConfig::new())
        .unwrap();
    assert_eq!(res.source, ResolutionSource::Fallback);
    assert_eq!(client.call_count(), 2);
    assert!(client.user_prompt(1).contains("\"left\""));
}

#[test]
fn backend_error_on_first_call_propagates() {
    let client = StubClient::failing("401 unauthorized");
    let err = resolver(&client, ResolverConfig::new())
        .resolve("ctx", &SamplingConfig::new())
        .unwrap_err();
    assert!(err.to_string().contains("unauthorized"));
    assert_eq!(client.call_count(), 1);
}

#[test]
fn custom_vocabulary_is_respected() {
    let vocab = Arc::new(MoveVocabulary::from_json(r#"{"WAIT": "stay", "GO": "up"}"#).unwrap());
    let prompts = TemplatePromptBuilder::new(&vocab);
    let client = StubClient::new(["UP", "WAIT"]);
    let rng = StdRng::seed_from_u64(SEED);
    let mut r = ActionResolver::new(&client, prompts, vocab, ResolverConfig::new(), rng);
    assert_eq!(r.resolve("ctx", &SamplingConfig::new()).unwrap(), "WAIT");
    assert_eq!(client.call_count(), 2);
}

#[test]
fn every_vocabulary_key_is_reachable_on_first_attempt() {
    assert!(MoveVocabulary::from_json(r#"{" UP": "up", "DOWN": "down"}"#).is_err());

    let json = r#"{"MOVE UP": "up", "WAIT": "stay"}"#;
    let vocab = Arc::new(MoveVocabulary::from_json(json).unwrap());
    for key in vocab.keys() {
        let client = StubClient::new([key]);
        let prompts = TemplatePromptBuilder::new(&vocab);
        let rng = StdRng::seed_from_u64(SEED);
        let config = ResolverConfig::new();
        let mut r = ActionResolver::new(&client, prompts, vocab.clone(), config, rng);
        let res = r.resolve_detailed("ctx", &SamplingConfig::new()).unwrap();
        assert_eq!(res.source, ResolutionSource::FirstAttempt);
        assert_eq!(res.action, key);
        assert_eq!(client.call_count(), 1);
    }
}
