use metrics_extender_core::{ExtenderPreemptionArgs, ExtenderPreemptionResult, MetaVictims};
use std::collections::BTreeMap;

/// Victim selection policy for the preemption verb
///
/// Receives the scheduler's proposed plan and returns the plan the extender
/// agrees to, keyed by node name in meta-victim form. Implementations may
/// drop nodes or victims but must not invent pods the scheduler did not
/// propose.
pub trait PreemptionPolicy: Send + Sync {
    /// Decide the victims per node
    fn select_victims(&self, args: &ExtenderPreemptionArgs) -> ExtenderPreemptionResult;

    /// Name of the policy
    fn name(&self) -> &str;
}

/// Accepts the scheduler's plan unchanged
///
/// The meta-victim mapping is returned exactly as received. A caller that
/// is not node-cache capable sends only full victims; they are reduced to
/// their pod UIDs so the scheduler still gets its plan back.
pub struct EchoVictims;

impl PreemptionPolicy for EchoVictims {
    fn select_victims(&self, args: &ExtenderPreemptionArgs) -> ExtenderPreemptionResult {
        if let Some(meta) = &args.node_name_to_meta_victims {
            return ExtenderPreemptionResult {
                node_name_to_meta_victims: Some(meta.clone()),
            };
        }

        let derived = args.node_name_to_victims.as_ref().map(|victims| {
            victims
                .iter()
                .map(|(node, v)| (node.clone(), MetaVictims::from(v)))
                .collect::<BTreeMap<_, _>>()
        });

        ExtenderPreemptionResult {
            node_name_to_meta_victims: derived,
        }
    }

    fn name(&self) -> &str {
        "EchoVictims"
    }
}
