//! Call/cache-hit counters, enabled by the `statistics` feature.
//!
//! Mirrors the thread-local counters-table / `print_stats` pattern common
//! to complement-edge apply engines, adapted to this crate's fixed set of
//! three operators instead of an indexed array over a generic operator
//! type.

use std::cell::Cell;

use crate::op::Op;

#[derive(Default)]
pub struct OpCounters {
    pub calls: Cell<u64>,
    pub cache_queries: Cell<u64>,
    pub cache_hits: Cell<u64>,
}

#[derive(Default)]
pub struct StatCounters {
    and: OpCounters,
    xor: OpCounters,
    ite: OpCounters,
    valuation: OpCounters,
}

impl StatCounters {
    fn counters(&self, op: Op) -> &OpCounters {
        match op {
            Op::And => &self.and,
            Op::Xor => &self.xor,
            Op::Ite => &self.ite,
            Op::Valuation => &self.valuation,
        }
    }

    pub fn call(&self, op: Op) {
        let c = self.counters(op);
        c.calls.set(c.calls.get() + 1);
    }

    pub fn cache_query(&self, op: Op) {
        let c = self.counters(op);
        c.cache_queries.set(c.cache_queries.get() + 1);
    }

    pub fn cache_hit(&self, op: Op) {
        let c = self.counters(op);
        c.cache_hits.set(c.cache_hits.get() + 1);
    }

    pub fn print(&self) {
        for (name, c) in [
            ("and", &self.and),
            ("xor", &self.xor),
            ("ite", &self.ite),
            ("valuation", &self.valuation),
        ] {
            println!(
                "{name}: calls={} cache_queries={} cache_hits={}",
                c.calls.get(),
                c.cache_queries.get(),
                c.cache_hits.get()
            );
        }
    }
}

thread_local! {
    pub static STAT_COUNTERS: StatCounters = StatCounters::default();
}

/// Record a call / cache-query / cache-hit event when the `statistics`
/// feature is enabled; a no-op expression otherwise.
macro_rules! stat {
    (call $op:expr) => {
        #[cfg(feature = "statistics")]
        $crate::stat::STAT_COUNTERS.with(|c| c.call($op))
    };
    (cache_query $op:expr) => {
        #[cfg(feature = "statistics")]
        $crate::stat::STAT_COUNTERS.with(|c| c.cache_query($op))
    };
    (cache_hit $op:expr) => {
        #[cfg(feature = "statistics")]
        $crate::stat::STAT_COUNTERS.with(|c| c.cache_hit($op))
    };
}

pub(crate) use stat;

/// Print accumulated counters to stdout.
pub fn print_stats() {
    STAT_COUNTERS.with(|c| c.print());
}
