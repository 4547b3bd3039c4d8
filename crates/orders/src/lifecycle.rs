//! Order lifecycle: status transitions and driver assignment.
//!
//! Decisions are taken in `handle` (pure) and recorded in `apply`, which is the
//! only code path that writes `Order::status` and `Order::tracking`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courier_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, Event, HistoryEntryId, OrderId, UserId,
};

use crate::model::{Order, StatusHistoryEntry, Tracking};
use crate::status::OrderStatus;

/// Command: ChangeStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub order_id: OrderId,
    pub entry_id: HistoryEntryId,
    pub status: OrderStatus,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AssignDriver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignDriver {
    pub order_id: OrderId,
    pub driver_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    ChangeStatus(ChangeStatus),
    AssignDriver(AssignDriver),
}

/// Event: StatusChanged. Carries the history entry to append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub order_id: OrderId,
    pub entry: StatusHistoryEntry,
}

/// Event: DriverAssigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverAssigned {
    pub order_id: OrderId,
    pub driver_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    StatusChanged(StatusChanged),
    DriverAssigned(DriverAssigned),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::StatusChanged(_) => "delivery.order.status_changed",
            OrderEvent::DriverAssigned(_) => "delivery.order.driver_assigned",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::StatusChanged(e) => e.entry.created_at,
            OrderEvent::DriverAssigned(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::StatusChanged(e) => {
                let entry = &e.entry;
                self.status = entry.status;
                self.tracking = Tracking {
                    current_status: entry.status,
                    last_updated: entry.created_at,
                };
                self.updated_at = entry.created_at;
                if entry.status == OrderStatus::Delivered {
                    self.detail.delivered_at = Some(entry.created_at);
                }
                self.status_history.push(entry.clone());
                self.version += 1;
            }
            OrderEvent::DriverAssigned(e) => {
                self.driver_id = Some(e.driver_id);
                if e.occurred_at > self.updated_at {
                    self.updated_at = e.occurred_at;
                }
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
            OrderCommand::AssignDriver(cmd) => self.handle_assign_driver(cmd),
        }
    }
}

impl Order {
    fn ensure_order_id(&self, order_id: OrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn handle_change_status(&self, cmd: &ChangeStatus) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_order_id(cmd.order_id)?;

        if !self.status.can_transition_to(cmd.status) {
            return Err(DomainError::validation(
                "ChangeStatus",
                "status",
                format!("cannot transition from {} to {}", self.status, cmd.status),
            ));
        }

        if let Some(latest) = self.latest_entry() {
            if cmd.occurred_at < latest.created_at {
                return Err(DomainError::invariant(format!(
                    "status change at {} predates latest history entry at {}",
                    cmd.occurred_at, latest.created_at
                )));
            }
        }

        Ok(vec![OrderEvent::StatusChanged(StatusChanged {
            order_id: cmd.order_id,
            entry: StatusHistoryEntry {
                id: cmd.entry_id,
                status: cmd.status,
                description: cmd.description.clone(),
                created_at: cmd.occurred_at,
            },
        })])
    }

    fn handle_assign_driver(&self, cmd: &AssignDriver) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_order_id(cmd.order_id)?;
        self.ensure_editable("AssignDriver")?;

        Ok(vec![OrderEvent::DriverAssigned(DriverAssigned {
            order_id: cmd.order_id,
            driver_id: cmd.driver_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn execute(&mut self, command: &OrderCommand) -> DomainResult<Vec<OrderEvent>> {
        let events = self.handle(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}

/// Move `order` to `status`, appending one history entry stamped `now`.
pub fn apply_status_transition(
    order: &mut Order,
    status: OrderStatus,
    description: impl Into<String>,
    now: DateTime<Utc>,
) -> DomainResult<StatusHistoryEntry> {
    let command = OrderCommand::ChangeStatus(ChangeStatus {
        order_id: *order.id(),
        entry_id: HistoryEntryId::new(),
        status,
        description: description.into(),
        occurred_at: now,
    });

    order
        .execute(&command)?
        .into_iter()
        .find_map(|event| match event {
            OrderEvent::StatusChanged(e) => Some(e.entry),
            OrderEvent::DriverAssigned(_) => None,
        })
        .ok_or_else(|| DomainError::invariant("status change produced no history entry"))
}

/// Attach a driver to an order that is still open for edits.
pub fn assign_driver(order: &mut Order, driver_id: UserId, now: DateTime<Utc>) -> DomainResult<()> {
    let command = OrderCommand::AssignDriver(AssignDriver {
        order_id: *order.id(),
        driver_id,
        occurred_at: now,
    });
    order.execute(&command).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{at, order};
    use crate::model::replay_status;
    use proptest::prelude::*;

    #[test]
    fn pending_accepted_delivered() {
        let mut order = order();

        apply_status_transition(&mut order, OrderStatus::Accepted, "driver on the way", at(10, 0))
            .unwrap();
        let entry = apply_status_transition(&mut order, OrderStatus::Delivered, "", at(15, 0)).unwrap();

        assert_eq!(order.status_history().len(), 3);
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert_eq!(entry.status, OrderStatus::Delivered);
        assert_eq!(entry.description, "");
        assert_eq!(order.updated_at(), at(15, 0));
        assert_eq!(order.tracking().last_updated, at(15, 0));
        assert_eq!(order.detail().delivered_at, Some(at(15, 0)));
    }

    #[test]
    fn illegal_edge_is_rejected_and_history_untouched() {
        let mut order = order();
        apply_status_transition(&mut order, OrderStatus::Accepted, "", at(10, 0)).unwrap();
        apply_status_transition(&mut order, OrderStatus::Delivered, "", at(11, 0)).unwrap();
        let before = order.clone();

        let err = apply_status_transition(&mut order, OrderStatus::Pending, "", at(12, 0)).unwrap_err();
        match err {
            DomainError::Validation { message, .. }
                if message.contains("cannot transition from DELIVERED to PENDING") => {}
            other => panic!("Expected Validation for illegal edge, got {other:?}"),
        }
        assert_eq!(order, before);
    }

    #[test]
    fn repeating_the_current_status_is_rejected() {
        let mut order = order();
        apply_status_transition(&mut order, OrderStatus::Accepted, "", at(10, 0)).unwrap();
        assert!(apply_status_transition(&mut order, OrderStatus::Accepted, "", at(10, 5)).is_err());
        assert_eq!(order.status_history().len(), 2);
    }

    #[test]
    fn backdated_transition_is_rejected() {
        let mut order = order();
        apply_status_transition(&mut order, OrderStatus::Accepted, "", at(10, 0)).unwrap();
        let err = apply_status_transition(&mut order, OrderStatus::Delivered, "", at(9, 30)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let order = order();
        let cmd = OrderCommand::ChangeStatus(ChangeStatus {
            order_id: *order.id(),
            entry_id: HistoryEntryId::new(),
            status: OrderStatus::Accepted,
            description: "accepted".to_string(),
            occurred_at: at(10, 0),
        });

        let events1 = order.handle(&cmd).unwrap();
        let events2 = order.handle(&cmd).unwrap();

        assert_eq!(events1, events2);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.status_history().len(), 1);
        assert_eq!(events1[0].event_type(), "delivery.order.status_changed");
        assert_eq!(events1[0].occurred_at(), at(10, 0));
    }

    #[test]
    fn command_for_another_order_is_rejected() {
        let order = order();
        let cmd = OrderCommand::ChangeStatus(ChangeStatus {
            order_id: OrderId::new(),
            entry_id: HistoryEntryId::new(),
            status: OrderStatus::Accepted,
            description: String::new(),
            occurred_at: at(10, 0),
        });
        assert!(matches!(
            order.handle(&cmd),
            Err(DomainError::InvariantViolation(msg)) if msg == "order_id mismatch"
        ));
    }

    #[test]
    fn driver_assignment_only_while_editable() {
        let mut order = order();
        let driver = UserId::new();
        let version = order.version();

        assign_driver(&mut order, driver, at(10, 0)).unwrap();
        assert_eq!(order.driver_id(), Some(driver));
        assert_eq!(order.version(), version);
        assert_eq!(order.status_history().len(), 1);

        apply_status_transition(&mut order, OrderStatus::Rejected, "", at(10, 30)).unwrap();
        let err = assign_driver(&mut order, UserId::new(), at(11, 0)).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "status", .. }));
        assert_eq!(order.driver_id(), Some(driver));
    }

    fn walk() -> impl Strategy<Value = Vec<(usize, i64)>> {
        // (successor choice, minutes until the change)
        prop::collection::vec((0usize..3, 0i64..240), 0..6)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: after N accepted transitions history has N+1 ordered
        /// entries and the cached status equals the replayed one.
        #[test]
        fn history_is_append_only_and_ordered(steps in walk()) {
            let mut order = order();
            let mut now = at(9, 0);
            let mut applied = 0usize;

            for (choice, minutes) in steps {
                let successors = order.status().allowed_next();
                if successors.is_empty() {
                    break;
                }
                let next = successors[choice % successors.len()];
                now += chrono::Duration::minutes(minutes);

                let prefix: Vec<_> = order.status_history().to_vec();
                apply_status_transition(&mut order, next, "", now).unwrap();
                applied += 1;

                prop_assert_eq!(&order.status_history()[..prefix.len()], &prefix[..]);
            }

            let history = order.status_history();
            prop_assert_eq!(history.len(), applied + 1);
            prop_assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
            prop_assert_eq!(Some(order.status()), replay_status(history));
            prop_assert_eq!(order.tracking().current_status, order.status());
        }
    }
}
