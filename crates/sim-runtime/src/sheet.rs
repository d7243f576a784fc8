//! Read-only view of prices and affordability for a renderer.

use sim_core::{EconConfig, EconomyState, Stage, StageTable};
use sim_econ::{bottleneck, brand_cost, can_settle, facility_cost, hire_cost, rates, sell_price};

/// Everything a renderer shows for one stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageQuote {
    /// Units per second.
    pub rate: f64,
    /// Output waiting downstream of the stage.
    pub stock: f64,
    pub workers: u32,
    pub facility_level: u32,
    pub hire_cost: f64,
    pub facility_cost: f64,
    pub can_hire: bool,
    pub can_upgrade: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PriceSheet {
    pub currency: f64,
    pub stages: StageTable<StageQuote>,
    pub sell_price: f64,
    pub brand_level: u32,
    pub brand_cost: f64,
    pub can_brand: bool,
    pub sell_queue: f64,
    pub can_settle: bool,
    /// Slowest stage; caps end-to-end throughput.
    pub bottleneck: Stage,
}

impl PriceSheet {
    pub fn build(state: &EconomyState, config: &EconConfig) -> Self {
        let rates = rates(state, config);
        let stages = StageTable::from_fn(|stage| {
            let hire = hire_cost(state, config, stage);
            let facility = facility_cost(state, config, stage);
            StageQuote {
                rate: rates[stage],
                stock: state.output(stage),
                workers: state.worker_count[stage],
                facility_level: state.facility_level[stage],
                hire_cost: hire,
                facility_cost: facility,
                can_hire: state.currency >= hire,
                can_upgrade: state.currency >= facility,
            }
        });
        let brand = brand_cost(state, config);
        Self {
            currency: state.currency,
            stages,
            sell_price: sell_price(state, config),
            brand_level: state.brand_level,
            brand_cost: brand,
            can_brand: state.currency >= brand,
            sell_queue: state.sell_queue,
            can_settle: can_settle(state),
            bottleneck: bottleneck(state, config),
        }
    }

    /// Cheapest purchase the balance covers, if any.
    pub fn cheapest_affordable(&self) -> Option<(Upgrade, f64)> {
        let mut options: Vec<(Upgrade, f64)> = Vec::with_capacity(Stage::COUNT * 2 + 1);
        for (stage, quote) in self.stages.iter() {
            if quote.can_hire {
                options.push((Upgrade::Hire(stage), quote.hire_cost));
            }
            if quote.can_upgrade {
                options.push((Upgrade::Facility(stage), quote.facility_cost));
            }
        }
        if self.can_brand {
            options.push((Upgrade::Brand, self.brand_cost));
        }
        options.into_iter().min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// A purchasable upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upgrade {
    Hire(Stage),
    Facility(Stage),
    Brand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_sheet_reflects_starting_balance() {
        let cfg = EconConfig::default();
        let s = EconomyState::new(&cfg);
        let sheet = PriceSheet::build(&s, &cfg);
        assert_eq!(sheet.currency, 30.0);
        assert!(sheet.stages[Stage::Dough].can_hire);
        assert!(!sheet.stages[Stage::Steam].can_hire);
        assert!(!sheet.stages[Stage::Dough].can_upgrade);
        assert!(!sheet.can_brand);
        assert!(!sheet.can_settle);
        assert_eq!(sheet.bottleneck, Stage::Dispatch);
        assert_eq!(sheet.stages[Stage::Dispatch].stock, s.sell_queue);
        assert_eq!(
            sheet.cheapest_affordable(),
            Some((Upgrade::Hire(Stage::Dough), 22.0))
        );
    }

    #[test]
    fn nothing_affordable_when_broke() {
        let cfg = EconConfig::default();
        let mut s = EconomyState::new(&cfg);
        s.currency = 0.0;
        assert_eq!(PriceSheet::build(&s, &cfg).cheapest_affordable(), None);
    }
}
