//! Concurrent access tests for the compiled pattern cache

use secured_attrs::{
    AttributeConstraint, AttributeRuleEvaluator, ClaimsBag, Decision, PatternCache,
    RequestContext, ValidatorRegistry,
};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_first_use_compiles_once() {
    let cache = Arc::new(PatternCache::new());
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let mut handles = vec![];

    for _ in 0..threads {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        let handle = thread::spawn(move || {
            barrier.wait();
            cache.compiled("[a-z]+-[0-9]{3}").unwrap()
        });
        handles.push(handle);
    }

    let compiled: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for pattern in &compiled {
        assert!(Arc::ptr_eq(pattern, &compiled[0]));
    }

    let stats = cache.stats();
    assert_eq!(stats.compilations, 1);
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits + stats.misses, threads);
}

#[test]
fn test_recompiling_matches_identically() {
    let cache = PatternCache::new();
    let first = cache.compiled("user-[0-9]+").unwrap();
    let second = cache.compiled("user-[0-9]+").unwrap();

    for value in ["user-1", "user-", "xuser-1", "user-12a", ""] {
        assert_eq!(first.is_match(value), second.is_match(value), "value {:?}", value);
    }
    assert_eq!(cache.stats().compilations, 1);
}

#[test]
fn test_parallel_evaluations_share_cache() {
    let evaluator = Arc::new(AttributeRuleEvaluator::new(
        Arc::new(PatternCache::new()),
        Arc::new(ValidatorRegistry::with_defaults()),
    ));
    let constraints: Arc<[AttributeConstraint]> = vec![
        AttributeConstraint::matches("iss", "[a-zA-Z]+"),
        AttributeConstraint::matches("sub", "user-[0-9]+"),
    ]
    .into();
    let mut handles = vec![];

    for i in 0..20 {
        let evaluator = Arc::clone(&evaluator);
        let constraints = Arc::clone(&constraints);
        let handle = thread::spawn(move || {
            let claims = ClaimsBag::new()
                .with_claim("iss", "myapp")
                .with_claim("sub", format!("user-{}", i));
            evaluator
                .evaluate(&RequestContext::new("/"), &claims, &constraints)
                .unwrap()
        });
        handles.push(handle);
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Decision::Allowed);
    }

    assert_eq!(evaluator.patterns().stats().compilations, 2);
    assert_eq!(evaluator.metrics().allowed, 20);
}
