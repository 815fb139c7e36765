//! # Profile Mixer Tests
//!
//! Weight validation and the weighted combination of every model component.

use memsynth_core::common::Error;
use memsynth_core::model::{Alphas, ProfileMixer};
use rstest::rstest;

use crate::common::{ALWAYS_ACTIVE, assert_all_close, assert_close, profile};

#[test]
fn test_identical_profiles_mix_to_themselves() {
    let p = profile(1, vec![1.0, 0.0], vec![0.5, 0.0], [[0.3, 0.7], [0.1, 0.9]]);
    let profiles = vec![p.clone(), p];
    let model = ProfileMixer::new(&profiles, &[]).unwrap().mix().unwrap();

    assert_all_close(&model.reuse_pmf, &[1.0, 0.0]);
    assert_all_close(&model.load_prop, &[0.5, 0.0]);
    assert_all_close(&model.activity.rows()[0], &[0.3, 0.7]);
    assert_all_close(&model.activity.rows()[1], &[0.1, 0.9]);
    assert_eq!(model.working_set, vec![0]);
    assert_eq!(model.block_size, 16);
}

#[test]
fn test_weighted_mix() {
    let mut a = profile(1, vec![0.5, 0.5], vec![1.0, 0.0], [[0.5, 0.5], [0.2, 0.8]]);
    a.alphas = Alphas::PerBlock(vec![vec![vec![[3.0, 1.0], [0.0, 0.0]]]]);
    let mut b = profile(
        2,
        vec![0.2, 0.4, 0.4],
        vec![0.0, 1.0, 1.0],
        [[0.9, 0.1], [0.4, 0.6]],
    );
    b.alphas = Alphas::PerBlock(vec![
        vec![vec![[1.0, 3.0], [2.0, 2.0]]],
        vec![vec![[0.0, 0.0], [0.0, 0.0]]],
    ]);

    let profiles = vec![a, b];
    let mixer = ProfileMixer::new(&profiles, &[3.0, 1.0]).unwrap();
    assert_eq!(mixer.weights(), &[3.0, 1.0]);
    let model = mixer.mix().unwrap();

    assert_all_close(&model.reuse_pmf, &[0.425, 0.475, 0.1]);
    assert_all_close(&model.load_prop, &[0.75, 0.25, 0.25]);
    assert_all_close(&model.activity.rows()[0], &[0.6, 0.4]);
    assert_all_close(&model.activity.rows()[1], &[0.25, 0.75]);
    assert_eq!(model.working_set, vec![0, 16]);

    assert_eq!(model.trees.len(), 2);
    assert_close(model.trees[0].alpha(0, 0), 0.625);
    assert_close(model.trees[0].alpha(0, 1), 0.5);
    assert_eq!(model.trees[1].counter(0, 0), [1.0, 0.0]);

    // Inputs are left untouched.
    assert_eq!(profiles[0].reuse_pmf, vec![0.5, 0.5]);
}

#[test]
fn test_zero_weight_profile_contributes_nothing() {
    let a = profile(1, vec![1.0, 0.0], vec![1.0, 1.0], ALWAYS_ACTIVE);
    let b = profile(1, vec![0.0, 1.0], vec![0.0, 0.0], ALWAYS_ACTIVE);
    let profiles = vec![a, b];
    let model = ProfileMixer::new(&profiles, &[1.0, 0.0]).unwrap().mix().unwrap();
    assert_all_close(&model.reuse_pmf, &[1.0, 0.0]);
    assert_all_close(&model.load_prop, &[1.0, 1.0]);
}

#[test]
fn test_extra_bins_come_from_the_wider_profile() {
    let mut narrow = profile(1, vec![1.0, 0.0], vec![1.0, 0.0], ALWAYS_ACTIVE);
    narrow.alphas = Alphas::PerBlock(vec![vec![vec![[3.0, 1.0], [0.0, 0.0]]]]);
    let mut wide = profile(1, vec![1.0, 0.0], vec![1.0, 0.0], ALWAYS_ACTIVE);
    wide.bins = 3;
    wide.alphas = Alphas::PerBlock(vec![vec![
        vec![[1.0, 1.0], [0.0, 0.0]],
        vec![[0.0, 0.0], [0.0, 0.0]],
        vec![[2.0, 2.0], [0.0, 0.0]],
    ]]);

    let profiles = vec![narrow, wide];
    let model = ProfileMixer::new(&profiles, &[]).unwrap().mix().unwrap();
    assert_eq!(model.bins, 3);
    let tree = &model.trees[0];
    assert_eq!(tree.bins(), 3);
    assert_close(tree.alpha(0, 0), 2.0 / 3.0);
    assert_close(tree.alpha(1, 0), 1.0);
    assert_close(tree.alpha(2, 0), 0.5);
    assert_eq!(tree.counter(1, 1), [1.0, 0.0]);
}

#[test]
fn test_equal_working_sets_keep_the_first() {
    let first = profile(2, vec![0.5, 0.5, 0.0], vec![0.0; 3], ALWAYS_ACTIVE);
    let mut second = profile(2, vec![0.5, 0.5, 0.0], vec![0.0; 3], ALWAYS_ACTIVE);
    second.working_set = vec![0x100, 0x110];

    let profiles = vec![first, second];
    let model = ProfileMixer::new(&profiles, &[1.0, 3.0]).unwrap().mix().unwrap();
    assert_eq!(model.working_set, vec![0, 16]);
}

#[rstest]
#[case(&[-1.0, 1.0])]
#[case(&[1.0, f64::NAN])]
fn test_invalid_weights(#[case] weights: &[f64]) {
    let p = profile(1, vec![1.0], vec![1.0], ALWAYS_ACTIVE);
    let profiles = vec![p.clone(), p];
    assert!(matches!(
        ProfileMixer::new(&profiles, weights),
        Err(Error::NegativeWeight { .. })
    ));
}

#[test]
fn test_mixer_validation() {
    let p = profile(1, vec![1.0], vec![1.0], ALWAYS_ACTIVE);
    let two = vec![p.clone(), p.clone()];

    assert!(matches!(
        ProfileMixer::new(&[], &[]),
        Err(Error::NoProfiles)
    ));
    assert!(matches!(
        ProfileMixer::new(&two, &[0.0, 0.0]),
        Err(Error::ZeroWeightSum)
    ));
    assert!(matches!(
        ProfileMixer::new(&two, &[1.0]),
        Err(Error::WeightCountMismatch {
            profiles: 2,
            weights: 1
        })
    ));

    let mut wide = p.clone();
    wide.block_size = 32;
    wide.alphas = Alphas::PerBlock(vec![vec![vec![[0.0; 2]; 3]]]);
    let mismatched = vec![p, wide];
    assert!(matches!(
        ProfileMixer::new(&mismatched, &[]),
        Err(Error::BlockSizeMismatch {
            expected: 16,
            found: 32
        })
    ));
}
