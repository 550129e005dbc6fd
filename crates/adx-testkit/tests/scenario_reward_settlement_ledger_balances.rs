//! Scenario: Reward Settlement Keeps The Ledger Balanced
//!
//! # Invariant under test
//! Every transaction the settlement pipeline commits must satisfy
//! Σ debits == Σ credits over its entry pairs, and value must be conserved:
//! whatever leaves the reward pools arrives, to the micro, in user wallets.
//! The platform share is never moved — it is what remains in the pools.

use adx_ledger::codes;
use adx_money::Ust;
use adx_reward::ShareOutcome;
use adx_schemas::WalletType;
use adx_testkit::{
    assert_ledger_balanced, funded_engine, insert_approved_campaign, placement_for, reward_policy,
    CampaignSpec, ScriptedOracle,
};
use uuid::Uuid;

#[test]
fn settlement_conserves_value_and_balances_every_transaction() {
    let fx = funded_engine(
        ScriptedOracle::default(),
        Ust::from_whole(100),
        Ust::from_whole(100),
    );
    let campaign = insert_approved_campaign(&fx.store, CampaignSpec::default());

    let authors: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let placement = placement_for(campaign.id, &authors, Ust::from_whole(1));
    // ads_cost 1.00 → creator 0.30, farming 0.30, viewer 0.10; platform
    // keeps the remaining 0.30 implicitly.
    let policy = reward_policy(
        Ust::from_whole(1),
        Ust::from_micros(300_000),
        Ust::from_micros(300_000),
        Ust::from_micros(100_000),
    );

    let report = fx.engine.distribute_ads_reward(&placement, &policy).unwrap();
    assert!(matches!(report.creator, ShareOutcome::Paid { .. }));
    assert!(matches!(report.farming, ShareOutcome::Paid { .. }));
    assert!(matches!(report.viewer, ShareOutcome::Paid { .. }));

    // GIVEN the settlement committed, THEN every transaction is balanced.
    assert_ledger_balanced(&fx.store);

    // Pool drawdown: personal pool funds creator + viewer, farming pool
    // funds farming only.
    assert_eq!(
        fx.engine.pool_balance(codes::SOCIAL_REWARD_PERSONAL),
        Ok(Ust::from_whole(100) - Ust::from_micros(400_000))
    );
    assert_eq!(
        fx.engine.pool_balance(codes::SOCIAL_REWARD_FARMING),
        Ok(Ust::from_whole(100) - Ust::from_micros(300_000))
    );

    // Conservation: pool drawdown reappears in wallets, to the micro.
    let wallet_total: Ust = authors
        .iter()
        .map(|a| fx.engine.wallet_balance(*a, WalletType::Personal))
        .sum::<Ust>()
        + fx.engine
            .wallet_balance(placement.viewer, WalletType::Personal);
    assert_eq!(wallet_total, Ust::from_micros(700_000));

    // The aggregate user liability account mirrors the same total.
    assert_eq!(
        fx.engine.pool_balance(codes::USER_PERSONAL),
        Ok(Ust::from_micros(700_000))
    );
}

#[test]
fn campaign_spend_statistics_updated_by_settlement() {
    let fx = funded_engine(
        ScriptedOracle::default(),
        Ust::from_whole(100),
        Ust::ZERO,
    );
    let campaign = insert_approved_campaign(&fx.store, CampaignSpec::default());

    let placement = placement_for(campaign.id, &[Uuid::new_v4()], Ust::from_whole(2));
    let policy = reward_policy(Ust::from_whole(2), Ust::from_whole(1), Ust::ZERO, Ust::ZERO);

    let report = fx.engine.distribute_ads_reward(&placement, &policy).unwrap();
    assert_eq!(report.charge.daily_spent, Ust::from_whole(2));
    assert!(!report.charge.auto_paused);

    let after = fx.engine.lookup_ads(campaign.id).unwrap();
    assert_eq!(after.statistics.budget_spent, Ust::from_whole(2));
    assert_eq!(after.statistics.impression.paid, 1);
}
