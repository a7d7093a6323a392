use super::{PilotSession, PilotSpec};
use crate::host::PlayerInput;
use crate::physics::ShipControls;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PilotAction {
    /// Crouch was pressed this tick; leave the helm.
    Exit,
    Steer(ShipControls),
}

/// Map one tick of player input onto ship controls.
///
/// Throttle moves one step per press (rising edge past the deadzone), not
/// with the intent magnitude. Rudder follows the strafe axis directly.
pub fn update_input(spec: &PilotSpec, session: &mut PilotSession, input: &PlayerInput) -> PilotAction {
    if input.crouching && !session.last_crouching {
        session.last_crouching = true;
        return PilotAction::Exit;
    }
    session.last_crouching = input.crouching;

    let forward = input.forward > spec.input_deadzone;
    let backward = input.forward < -spec.input_deadzone;
    let max = spec.max_throttle_step;
    if forward && !session.last_forward {
        session.throttle_step = (session.throttle_step + 1).min(max);
    }
    if backward && !session.last_backward {
        session.throttle_step = (session.throttle_step - 1).max(-max);
    }
    session.last_forward = forward;
    session.last_backward = backward;
    session.last_head_yaw = input.head_yaw;

    let throttle = if max > 0 {
        f64::from(session.throttle_step) / f64::from(max)
    } else {
        0.0
    };
    PilotAction::Steer(ShipControls {
        throttle,
        rudder: input.right.clamp(-1.0, 1.0),
        wheel: session.wheel_angle,
    })
}
