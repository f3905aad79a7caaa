
use apura::ledger::{AssetClass, OperationKind, TaxMonth};
use apura::tax::{
    assess_month, calculate_monthly_tax, replay_loss_state, LossState, TradeKind,
};
use ledger_helpers::{buy, holding, operation, sell};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_weighted_average_across_buys_in_assessment() {
    let holdings = vec![holding(
        "petr4",
        AssetClass::Stock,
        vec![
            buy("petr4", 1, "2024-01-05", dec!(100), dec!(10)),
            buy("petr4", 2, "2024-01-20", dec!(100), dec!(20)),
            sell("petr4", 3, "2024-02-10", dec!(50), dec!(18)),
        ],
    )];

    let result = assess_month(&holdings, TaxMonth::new(2024, 2));

    let sale = &result.details[0];
    assert_eq!(sale.average_price, dec!(15));
    assert_eq!(sale.gain, dec!(150));
}

#[test]
fn test_acquisition_fees_raise_cost_basis() {
    let holdings = vec![holding(
        "itub4",
        AssetClass::Stock,
        vec![
            operation(
                "itub4",
                1,
                OperationKind::Buy,
                "2024-01-05",
                dec!(100),
                dec!(10),
                dec!(25),
            ),
            operation(
                "itub4",
                2,
                OperationKind::Sell,
                "2024-02-15",
                dec!(40),
                dec!(12),
                dec!(5),
            ),
        ],
    )];

    let result = assess_month(&holdings, TaxMonth::new(2024, 2));

    let sale = &result.details[0];
    assert_eq!(sale.average_price, dec!(10.25));
    // (12 - 10.25) * 40 - 5 in sale fees
    assert_eq!(sale.gain, dec!(65));
}

#[test]
fn test_emptied_position_leaves_no_cost_residue() {
    // The first cycle's average is a repeating decimal (0.31 / 3). Selling
    // out must reset the position exactly, so the second cycle's average
    // is a clean 2.
    let holdings = vec![holding(
        "mglu3",
        AssetClass::Stock,
        vec![
            operation(
                "mglu3",
                1,
                OperationKind::Buy,
                "2024-01-05",
                dec!(3),
                dec!(0.10),
                dec!(0.01),
            ),
            sell("mglu3", 2, "2024-02-10", dec!(3), dec!(1)),
            buy("mglu3", 3, "2024-03-05", dec!(10), dec!(2)),
            sell("mglu3", 4, "2024-04-10", dec!(10), dec!(3)),
        ],
    )];

    let result = assess_month(&holdings, TaxMonth::new(2024, 4));

    let sale = &result.details[0];
    assert_eq!(sale.average_price, dec!(2));
    assert_eq!(sale.gain, dec!(10));
}

#[test]
fn test_same_day_round_trip_is_day_trade() {
    let holdings = vec![holding(
        "wege3",
        AssetClass::Stock,
        vec![
            buy("wege3", 1, "2024-03-01", dec!(100), dec!(10)),
            sell("wege3", 2, "2024-03-01", dec!(50), dec!(11)),
            sell("wege3", 3, "2024-03-02", dec!(50), dec!(11)),
        ],
    )];

    let result = assess_month(&holdings, TaxMonth::new(2024, 3));

    let kinds: Vec<(TradeKind, Decimal)> = result
        .details
        .iter()
        .map(|sale| (sale.trade_kind, sale.gain))
        .collect();
    assert_eq!(
        kinds,
        vec![(TradeKind::Swing, dec!(50)), (TradeKind::DayTrade, dec!(50))]
    );

    // Swing bucket is exempt (volume 550), the day-trade gain still pays 20%
    let breakdown = &result.breakdowns[0];
    assert!(breakdown.exempt);
    assert_eq!(breakdown.swing.tax_due, Decimal::ZERO);
    assert_eq!(breakdown.day_trade.tax_due, dec!(10));
    assert_eq!(result.summary.tax_due, dec!(10));
}

#[test]
fn test_stock_exemption_boundary_is_strict() {
    // Volume R$ 19.999,99: exempt, the 10000 gain goes untaxed
    let holdings = vec![holding(
        "bbas3",
        AssetClass::Stock,
        vec![
            buy("bbas3", 1, "2024-01-05", dec!(1), dec!(9999.99)),
            sell("bbas3", 2, "2024-03-10", dec!(1), dec!(19999.99)),
        ],
    )];
    let result = assess_month(&holdings, TaxMonth::new(2024, 3));
    assert!(result.breakdowns[0].exempt);
    assert_eq!(result.summary.tax_due, Decimal::ZERO);

    // Volume exactly R$ 20.000,00: taxed in full
    let holdings = vec![holding(
        "bbas3",
        AssetClass::Stock,
        vec![
            buy("bbas3", 1, "2024-01-05", dec!(1), dec!(10000)),
            sell("bbas3", 2, "2024-03-10", dec!(1), dec!(20000)),
        ],
    )];
    let result = assess_month(&holdings, TaxMonth::new(2024, 3));
    assert!(!result.breakdowns[0].exempt);
    assert_eq!(result.summary.tax_due, dec!(1500));
    assert_eq!(result.summary.withheld_tax, dec!(1));
    assert_eq!(result.summary.payable_tax, dec!(1499));
}

#[test]
fn test_crypto_threshold_counts_swing_and_day_volume_together() {
    // Swing volume alone (20000) is under the crypto limit, but the same
    // month's day-trade volume pushes the combined total to 35001.
    let holdings = vec![
        holding(
            "btc",
            AssetClass::Crypto,
            vec![
                buy("btc", 1, "2024-01-05", dec!(1), dec!(15000)),
                sell("btc", 2, "2024-03-10", dec!(1), dec!(20000)),
            ],
        ),
        holding(
            "eth",
            AssetClass::Crypto,
            vec![
                buy("eth", 1, "2024-03-20", dec!(1), dec!(15000)),
                sell("eth", 2, "2024-03-20", dec!(1), dec!(15001)),
            ],
        ),
    ];

    let result = assess_month(&holdings, TaxMonth::new(2024, 3));

    let breakdown = &result.breakdowns[0];
    assert_eq!(breakdown.asset_class, AssetClass::Crypto);
    assert!(!breakdown.exempt);
    // 5000 swing gain and 1 day gain, both at 15%, nothing withheld
    assert_eq!(result.summary.tax_due, dec!(750.15));
    assert_eq!(result.summary.withheld_tax, Decimal::ZERO);
    assert_eq!(result.summary.payable_tax, dec!(750.15));
}

#[test]
fn test_crypto_under_threshold_is_exempt() {
    let holdings = vec![holding(
        "btc",
        AssetClass::Crypto,
        vec![
            buy("btc", 1, "2024-01-05", dec!(1), dec!(30000)),
            sell("btc", 2, "2024-03-10", dec!(1), dec!(34999)),
        ],
    )];

    let result = assess_month(&holdings, TaxMonth::new(2024, 3));

    assert!(result.breakdowns[0].exempt);
    assert_eq!(result.summary.tax_due, Decimal::ZERO);
}

#[test]
fn test_loss_carries_forward_and_compensates() {
    // February: 1000 loss above the exemption volume. March: 1500 gain.
    let holdings = vec![
        holding(
            "vale3",
            AssetClass::Stock,
            vec![
                buy("vale3", 1, "2024-01-05", dec!(1000), dec!(26)),
                sell("vale3", 2, "2024-02-15", dec!(1000), dec!(25)),
            ],
        ),
        holding(
            "petr4",
            AssetClass::Stock,
            vec![
                buy("petr4", 1, "2024-01-05", dec!(1000), dec!(19.50)),
                sell("petr4", 2, "2024-03-15", dec!(1000), dec!(21)),
            ],
        ),
    ];

    let carried = replay_loss_state(&holdings, TaxMonth::new(2024, 3));
    assert_eq!(carried.carried(AssetClass::Stock), dec!(-1000));

    let result = assess_month(&holdings, TaxMonth::new(2024, 3));
    let breakdown = &result.breakdowns[0];
    assert_eq!(breakdown.loss_used, dec!(1000));
    assert_eq!(breakdown.swing.taxable, dec!(500));
    assert_eq!(result.summary.tax_due, dec!(75));
    assert!(result.loss_state.is_clear());
}

#[test]
fn test_exempt_month_loss_does_not_accrue() {
    // A swing loss under the exemption volume disappears instead of
    // feeding the carryforward.
    let holdings = vec![holding(
        "cogn3",
        AssetClass::Stock,
        vec![
            buy("cogn3", 1, "2024-01-05", dec!(100), dec!(15)),
            sell("cogn3", 2, "2024-02-10", dec!(100), dec!(10)),
        ],
    )];

    let result = assess_month(&holdings, TaxMonth::new(2024, 2));
    assert!(result.breakdowns[0].exempt);
    assert_eq!(result.breakdowns[0].swing.net, dec!(-500));
    assert!(result.loss_state.is_clear());

    assert!(replay_loss_state(&holdings, TaxMonth::new(2024, 3)).is_clear());
}

#[test]
fn test_swing_compensation_runs_before_day_trade() {
    let mut carried = LossState::new();
    carried.set(AssetClass::Stock, dec!(-100));

    let holdings = vec![
        holding(
            "sanb11",
            AssetClass::Stock,
            vec![
                buy("sanb11", 1, "2024-01-05", dec!(1000), dec!(20)),
                sell("sanb11", 2, "2024-03-12", dec!(1000), dec!(20.06)),
            ],
        ),
        holding(
            "b3sa3",
            AssetClass::Stock,
            vec![
                buy("b3sa3", 1, "2024-03-10", dec!(100), dec!(10)),
                sell("b3sa3", 2, "2024-03-10", dec!(100), dec!(10.60)),
            ],
        ),
    ];

    let result = calculate_monthly_tax(&holdings, TaxMonth::new(2024, 3), &carried);

    let breakdown = &result.breakdowns[0];
    // Swing gain of 60 consumes the carryforward first, the day-trade
    // gain of 60 gets what is left (40), leaving 20 taxable at 20%.
    assert_eq!(breakdown.swing.taxable, Decimal::ZERO);
    assert_eq!(breakdown.day_trade.taxable, dec!(20));
    assert_eq!(breakdown.loss_used, dec!(100));
    assert_eq!(breakdown.tax_due, dec!(4));
    assert_eq!(breakdown.loss_remaining, Decimal::ZERO);
}

#[test]
fn test_withholding_never_drives_payable_negative() {
    // Day-trade churn: 100.010 of volume withholds 1000,10 at source while
    // the 10 gain owes only 2 of tax. Nothing is refunded here.
    let holdings = vec![holding(
        "prio3",
        AssetClass::Stock,
        vec![
            buy("prio3", 1, "2024-03-15", dec!(10000), dec!(10)),
            sell("prio3", 2, "2024-03-15", dec!(10000), dec!(10.001)),
        ],
    )];

    let result = assess_month(&holdings, TaxMonth::new(2024, 3));

    assert_eq!(result.summary.tax_due, dec!(2));
    assert_eq!(result.summary.withheld_tax, dec!(1000.10));
    assert_eq!(result.summary.payable_tax, Decimal::ZERO);
    assert!(!result.summary.has_tax_due);
}

#[test]
fn test_fii_pays_20_percent_with_no_exemption() {
    let holdings = vec![holding(
        "hglg11",
        AssetClass::Fii,
        vec![
            buy("hglg11", 1, "2024-01-05", dec!(10), dec!(90)),
            sell("hglg11", 2, "2024-03-10", dec!(10), dec!(100)),
        ],
    )];

    let result = assess_month(&holdings, TaxMonth::new(2024, 3));

    let breakdown = &result.breakdowns[0];
    assert!(!breakdown.exempt);
    assert_eq!(result.summary.tax_due, dec!(20));
    assert_eq!(result.summary.withheld_tax, dec!(0.05));
    assert_eq!(result.summary.payable_tax, dec!(19.95));
}

#[test]
fn test_sale_without_history_treats_cost_as_zero() {
    let holdings = vec![holding(
        "xpml11",
        AssetClass::Fii,
        vec![sell("xpml11", 1, "2024-03-10", dec!(10), dec!(50))],
    )];

    let result = assess_month(&holdings, TaxMonth::new(2024, 3));

    let sale = &result.details[0];
    assert_eq!(sale.trade_kind, TradeKind::Swing);
    assert_eq!(sale.average_price, Decimal::ZERO);
    assert_eq!(sale.gain, dec!(500));
    assert_eq!(result.summary.tax_due, dec!(100));
}

#[test]
fn test_unknown_asset_class_stays_out_of_the_assessment() {
    let holdings = vec![
        holding(
            "tesouro-ipca",
            AssetClass::Other,
            vec![
                buy("tesouro-ipca", 1, "2024-01-05", dec!(10), dec!(100)),
                sell("tesouro-ipca", 2, "2024-03-10", dec!(10), dec!(150)),
            ],
        ),
        holding(
            "petr4",
            AssetClass::Stock,
            vec![
                buy("petr4", 1, "2024-01-05", dec!(100), dec!(10)),
                sell("petr4", 2, "2024-03-10", dec!(50), dec!(12)),
            ],
        ),
    ];

    let result = assess_month(&holdings, TaxMonth::new(2024, 3));

    assert_eq!(result.breakdowns.len(), 1);
    assert_eq!(result.breakdowns[0].asset_class, AssetClass::Stock);
    assert_eq!(result.details.len(), 1);
    assert_eq!(result.details[0].holding_id, "petr4");
}

#[test]
fn test_assessment_is_deterministic() {
    let holdings = vec![
        holding(
            "petr4",
            AssetClass::Stock,
            vec![
                buy("petr4", 1, "2024-01-05", dec!(1000), dec!(26)),
                sell("petr4", 2, "2024-02-15", dec!(1000), dec!(25)),
                buy("petr4", 3, "2024-03-11", dec!(500), dec!(24)),
                sell("petr4", 4, "2024-03-11", dec!(500), dec!(24.50)),
            ],
        ),
        holding(
            "btc",
            AssetClass::Crypto,
            vec![
                buy("btc", 1, "2024-01-05", dec!(2), dec!(20000)),
                sell("btc", 2, "2024-03-20", dec!(1), dec!(36000)),
            ],
        ),
    ];

    let first = assess_month(&holdings, TaxMonth::new(2024, 3));
    let second = assess_month(&holdings, TaxMonth::new(2024, 3));

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_replay_agrees_with_month_by_month_threading() {
    let holdings = vec![
        holding(
            "vale3",
            AssetClass::Stock,
            vec![
                buy("vale3", 1, "2024-01-05", dec!(2000), dec!(30)),
                sell("vale3", 2, "2024-02-15", dec!(1000), dec!(25)),
                sell("vale3", 3, "2024-04-10", dec!(500), dec!(33)),
                sell("vale3", 4, "2024-05-20", dec!(500), dec!(40)),
            ],
        ),
        holding(
            "btc",
            AssetClass::Crypto,
            vec![
                buy("btc", 1, "2024-01-10", dec!(2), dec!(25000)),
                sell("btc", 2, "2024-03-05", dec!(1), dec!(20000)),
                sell("btc", 3, "2024-05-15", dec!(1), dec!(40000)),
            ],
        ),
    ];

    for month in [
        TaxMonth::new(2024, 2),
        TaxMonth::new(2024, 3),
        TaxMonth::new(2024, 4),
        TaxMonth::new(2024, 5),
    ] {
        let carried = replay_loss_state(&holdings, month);
        let result = calculate_monthly_tax(&holdings, month, &carried);
        assert_eq!(
            result.loss_state,
            replay_loss_state(&holdings, month.next()),
            "state leaving {month} must equal the state replayed into the next month"
        );
    }
}
