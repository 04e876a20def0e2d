//! Poisson stream of incoming calls.

use std::cell::RefCell;
use std::rc::Rc;

use rand_distr::Exp;

use callsim_core::{log_info, log_trace, ResourcePool, SimError, SimulationContext};

use crate::customer::Customer;
use crate::sampler::ExpSampler;
use crate::stats::{CustomerId, StatisticsCollector};

/// Spawns customers separated by exponentially distributed gaps.
///
/// The generator never finishes by itself, the run is bounded by the simulation horizon.
pub struct ArrivalGenerator {
    ctx: SimulationContext,
    customer_ctx: SimulationContext,
    agents: Rc<ResourcePool>,
    stats: Rc<RefCell<StatisticsCollector>>,
    gaps: ExpSampler,
    service_time: Exp<f64>,
    abandonment_threshold: f64,
    next_id: CustomerId,
}

impl ArrivalGenerator {
    pub fn new(
        ctx: SimulationContext,
        customer_ctx: SimulationContext,
        agents: Rc<ResourcePool>,
        stats: Rc<RefCell<StatisticsCollector>>,
        gaps: ExpSampler,
        service_time: Exp<f64>,
        abandonment_threshold: f64,
    ) -> Self {
        Self {
            ctx,
            customer_ctx,
            agents,
            stats,
            gaps,
            service_time,
            abandonment_threshold,
            next_id: 1,
        }
    }

    pub async fn run(mut self) -> Result<(), SimError> {
        log_info!(self.ctx, "line opened with {} agents", self.agents.capacity());
        loop {
            let gap = self.gaps.sample();
            self.ctx.sleep(gap)?.await;

            let customer = Customer::new(
                self.next_id,
                self.customer_ctx.clone(),
                self.agents.clone(),
                self.stats.clone(),
                self.service_time,
                self.abandonment_threshold,
            );
            self.next_id += 1;
            log_trace!(self.ctx, "#{} arrived", customer.id());
            self.ctx.spawn(customer.run());
        }
    }
}
