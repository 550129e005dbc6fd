//! Scenario: Retry After Partial Settlement Skips Already-Paid Shares
//!
//! # Invariant under test
//! Each `(placement, share-kind)` pays out at most once, no matter how many
//! times distribution is invoked.  After a crash that left only some shares
//! committed, the committed ones stand (each is individually balanced) and
//! a retry pays exactly the missing ones.

use adx_money::Ust;
use adx_reward::{RewardDistributor, ShareOutcome};
use adx_schemas::WalletType;
use adx_testkit::{
    assert_ledger_balanced, funded_engine, insert_approved_campaign, placement_for, reward_policy,
    CampaignSpec, ScriptedOracle,
};
use uuid::Uuid;

#[test]
fn retry_after_partial_settlement_pays_only_missing_shares() {
    let fx = funded_engine(
        ScriptedOracle::default(),
        Ust::from_whole(100),
        Ust::from_whole(100),
    );
    let campaign = insert_approved_campaign(&fx.store, CampaignSpec::default());

    let author = Uuid::new_v4();
    let placement = placement_for(campaign.id, &[author], Ust::from_whole(1));
    let policy = reward_policy(
        Ust::from_whole(1),
        Ust::from_micros(300_000),
        Ust::from_micros(300_000),
        Ust::from_micros(100_000),
    );

    // Simulate the pre-crash half: only the creator share was committed.
    let distributor = RewardDistributor::new(fx.store.clone(), fx.platform);
    let first = distributor
        .distribute_content_creator_reward(&placement, &policy)
        .unwrap();
    assert!(matches!(first, ShareOutcome::Paid { .. }));

    // Retry the whole settlement.
    let report = fx.engine.distribute_ads_reward(&placement, &policy).unwrap();
    assert_eq!(report.creator, ShareOutcome::AlreadyApplied);
    assert!(matches!(report.farming, ShareOutcome::Paid { .. }));
    assert!(matches!(report.viewer, ShareOutcome::Paid { .. }));

    // The author was paid the creator share once, not twice.
    assert_eq!(
        fx.engine.wallet_balance(author, WalletType::Personal),
        Ust::from_micros(300_000) + Ust::from_micros(300_000),
        "one creator share + one farming share"
    );
    assert_ledger_balanced(&fx.store);
}

#[test]
fn second_full_settlement_repays_nothing() {
    let fx = funded_engine(
        ScriptedOracle::default(),
        Ust::from_whole(100),
        Ust::from_whole(100),
    );
    let campaign = insert_approved_campaign(&fx.store, CampaignSpec::default());

    let author = Uuid::new_v4();
    let placement = placement_for(campaign.id, &[author], Ust::from_whole(1));
    let policy = reward_policy(
        Ust::from_whole(1),
        Ust::from_micros(300_000),
        Ust::ZERO,
        Ust::from_micros(100_000),
    );

    fx.engine.distribute_ads_reward(&placement, &policy).unwrap();
    let tx_count_after_first = fx.store.transaction_count();

    let report = fx.engine.distribute_ads_reward(&placement, &policy).unwrap();
    assert_eq!(report.creator, ShareOutcome::AlreadyApplied);
    assert_eq!(report.farming, ShareOutcome::NothingToPay);
    assert_eq!(report.viewer, ShareOutcome::AlreadyApplied);

    // No new ledger transactions, no new wallet credits.
    assert_eq!(fx.store.transaction_count(), tx_count_after_first);
    assert_eq!(
        fx.engine.wallet_balance(author, WalletType::Personal),
        Ust::from_micros(300_000)
    );
}

#[test]
fn insufficient_pool_skips_share_but_siblings_stand() {
    // Personal pool can cover the viewer share but not the creator share.
    let fx = funded_engine(
        ScriptedOracle::default(),
        Ust::from_micros(150_000),
        Ust::from_whole(100),
    );
    let campaign = insert_approved_campaign(&fx.store, CampaignSpec::default());

    let author = Uuid::new_v4();
    let placement = placement_for(campaign.id, &[author], Ust::from_whole(1));

    // Farming alone succeeds from its own pool...
    let distributor = RewardDistributor::new(fx.store.clone(), fx.platform);
    let farming_only = reward_policy(
        Ust::from_whole(1),
        Ust::ZERO,
        Ust::from_micros(300_000),
        Ust::ZERO,
    );
    distributor
        .distribute_content_farming_reward(&placement, &farming_only)
        .unwrap();

    // ...then a composed settlement with an uncoverable creator share fails
    // and commits nothing further.
    let policy = reward_policy(
        Ust::from_whole(1),
        Ust::from_micros(300_000),
        Ust::from_micros(300_000),
        Ust::from_micros(100_000),
    );
    let err = fx.engine.distribute_ads_reward(&placement, &policy);
    assert!(err.is_err());

    // The farming payout from the earlier invocation stands.
    assert_eq!(
        fx.engine.wallet_balance(author, WalletType::Personal),
        Ust::from_micros(300_000)
    );
    // The failed invocation left no partial viewer payout behind.
    assert_eq!(
        fx.engine.wallet_balance(placement.viewer, WalletType::Personal),
        Ust::ZERO
    );
    assert_ledger_balanced(&fx.store);
}
