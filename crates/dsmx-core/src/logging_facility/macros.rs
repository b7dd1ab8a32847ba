//! Boundary logging macros
//!
//! Every façade operation logs a `start` event and exactly one of `end` or
//! `end_error`. Field names follow `dsmx_core_types::schema`; tracing needs
//! them as identifiers, so they are spelled out here.
//!
//! Journaled mutations use the `log_action_*` forms, which stamp the
//! `action_type`, `element_id` and `relation_id` of the action being
//! recorded. Ids that are not known yet (a create before it was applied)
//! are left off the event.

#[doc(hidden)]
#[macro_export]
macro_rules! __dsm_boundary {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use dsmx_core::log_op_start;
/// log_op_start!("sort", element_id = 3, algorithm = "Partition");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__dsm_boundary!(
            info,
            $op,
            dsmx_core_types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Log the successful end of an operation with its duration
///
/// ```
/// # use dsmx_core::log_op_end;
/// log_op_end!("sort", duration_ms = 42, cluster_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__dsm_boundary!(
            info,
            $op,
            dsmx_core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log a failed operation with the error's kind and stable code
///
/// ```
/// # use dsmx_core::{log_op_error, errors::DsmError};
/// # use dsmx_core_types::ElementId;
/// let err = DsmError::CannotDelete { element_id: ElementId(0), reason: "root".into() };
/// log_op_error!("delete_element", err, duration_ms = 10, element_id = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__dsm_boundary!(
            error,
            $op,
            dsmx_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code()
            $(, $($field)*)?
        )
    }};
}

/// Log the start of a journaled mutation
#[macro_export]
macro_rules! log_action_start {
    ($op:expr, $action:expr) => {{
        let action: &$crate::actions::Action = $action;
        $crate::log_op_start!(
            $op,
            action_type = action.action_type().as_str(),
            element_id = action.element_id().map(|id| id.get()),
            relation_id = action.relation_id().map(|id| id.get())
        )
    }};
}

/// Log a recorded mutation, including the ids it created
#[macro_export]
macro_rules! log_action_end {
    ($op:expr, $action:expr, duration_ms = $duration:expr) => {{
        let action: &$crate::actions::Action = $action;
        $crate::log_op_end!(
            $op,
            duration_ms = $duration,
            action_type = action.action_type().as_str(),
            element_id = action.element_id().map(|id| id.get()),
            relation_id = action.relation_id().map(|id| id.get())
        )
    }};
}

/// Log a mutation the journal refused; nothing was recorded
#[macro_export]
macro_rules! log_action_error {
    ($op:expr, $action_type:expr, $err:expr, duration_ms = $duration:expr) => {{
        let action_type: $crate::actions::ActionType = $action_type;
        $crate::log_op_error!(
            $op,
            $err,
            duration_ms = $duration,
            action_type = action_type.as_str()
        )
    }};
}
