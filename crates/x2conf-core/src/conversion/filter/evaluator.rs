//! Filter chain evaluation with per-stage provenance
//!
//! Stages run left to right. A stage whose output text differs from its input
//! records one Transform event labelled with the stage name. `default` is the
//! exception: it records a Default event when it supplied the value and a
//! Direct event when it kept the original. Complex lines record nothing here;
//! the resolver aggregates them afterwards.

use crate::conversion::context::ResolutionContext;
use crate::conversion::filter::builtin::BuiltinFilter;
use crate::conversion::filter::parser::FilterChain;
use crate::conversion::filter::registry::{Filter, FilterRegistry};
use crate::conversion::filter::value::FilterValue;
use crate::conversion::provenance::ProvenanceTracker;
use crate::error::ResolutionIssue;
use tracing::{trace, warn};

const DEFAULT_KEPT_NOTE: &str = "Used original value, default value not applied";

#[derive(Debug, Clone, Copy)]
pub struct ChainEvaluator<'a> {
    registry: FilterRegistry<'a>,
}

impl<'a> ChainEvaluator<'a> {
    pub fn new(registry: FilterRegistry<'a>) -> Self {
        Self { registry }
    }

    /// Thread `input` through every stage of `chain`
    pub fn evaluate(
        &self,
        chain: &FilterChain,
        input: String,
        ctx: &ResolutionContext,
        tracker: &mut ProvenanceTracker,
    ) -> String {
        let mut value = FilterValue::Text(input);

        for invocation in chain.stages() {
            let Some(filter) = self.registry.lookup(&invocation.name) else {
                warn!(
                    filter = %invocation.name,
                    issue = %ResolutionIssue::UnsupportedFilter,
                    "unsupported filter, value passed through"
                );
                continue;
            };

            let before = value.render();
            value = filter.apply(value, invocation);
            let after = value.render();
            trace!(filter = %invocation.name, %before, %after, "applied filter");

            if !ctx.records_stages() {
                continue;
            }

            match filter {
                Filter::Builtin(BuiltinFilter::Default) => {
                    if before.is_empty() {
                        let fallback = invocation.argument().unwrap_or_default();
                        tracker.record_default(
                            ctx.target_path(),
                            &after,
                            &format!("Applied default value: {}", fallback),
                        );
                    } else {
                        tracker.record_direct(
                            ctx.source_path(),
                            ctx.target_path(),
                            &after,
                            DEFAULT_KEPT_NOTE,
                        );
                    }
                }
                _ if before != after => {
                    tracker.record_transform(
                        ctx.source_path(),
                        ctx.target_path(),
                        &after,
                        &invocation.name,
                    );
                }
                _ => {}
            }
        }

        value.into_text()
    }
}
