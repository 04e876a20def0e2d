//! Customer lifecycle.

use std::cell::RefCell;
use std::rc::Rc;

use rand_distr::Exp;

use callsim_core::{log_debug, AwaitResult, ResourcePool, SimError, SimulationContext};

use crate::stats::{CustomerId, StatisticsCollector};

/// A single caller: waits for an agent at most `abandonment_threshold`, then either talks to the agent
/// for an exponentially distributed time or hangs up.
pub struct Customer {
    id: CustomerId,
    ctx: SimulationContext,
    agents: Rc<ResourcePool>,
    stats: Rc<RefCell<StatisticsCollector>>,
    service_time: Exp<f64>,
    abandonment_threshold: f64,
}

impl Customer {
    pub fn new(
        id: CustomerId,
        ctx: SimulationContext,
        agents: Rc<ResourcePool>,
        stats: Rc<RefCell<StatisticsCollector>>,
        service_time: Exp<f64>,
        abandonment_threshold: f64,
    ) -> Self {
        Self {
            id,
            ctx,
            agents,
            stats,
            service_time,
            abandonment_threshold,
        }
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    /// Runs the customer from arrival until the call is completed or abandoned.
    pub async fn run(self) -> Result<(), SimError> {
        let arrival = self.ctx.time();
        self.stats.borrow_mut().record_arrival(self.id, arrival);

        let request = self.agents.acquire();
        match request.with_timeout(self.abandonment_threshold).await? {
            AwaitResult::Granted => self.serve(arrival).await,
            AwaitResult::Timeout { timeout } => {
                self.agents.withdraw(&request);
                self.stats.borrow_mut().record_abandoned(self.id, self.ctx.time());
                log_debug!(self.ctx, "#{} hung up after waiting {:.3}", self.id, timeout);
                Ok(())
            }
        }
    }

    async fn serve(&self, arrival: f64) -> Result<(), SimError> {
        let now = self.ctx.time();
        let wait = now - arrival;
        self.stats.borrow_mut().record_served(self.id, now, wait);
        log_debug!(self.ctx, "#{} served after waiting {:.3}", self.id, wait);

        let service_time = self.ctx.sample_from_distribution(&self.service_time);
        self.ctx.sleep(service_time)?.await;
        self.agents.release();
        self.stats.borrow_mut().record_handled(self.id);
        log_debug!(self.ctx, "#{} completed the call in {:.3}", self.id, service_time);
        Ok(())
    }
}
