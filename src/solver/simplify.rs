use crate::{
    error::{Error, Result},
    solver::{
        state::CspState,
        termination::{checkpoint, Termination},
        value::Value,
        variable::VariableName,
    },
};

impl<V: Value> CspState<V> {
    /// Prunes domains from the pre-assigned variables: for every assigned
    /// X=v and every constraint pairing X with an unassigned Y, if setting
    /// Y=v would flip that constraint from satisfied to unsatisfied, v is
    /// removed from Dom(Y). A domain collapsing to a single value assigns it.
    ///
    /// This predates [`CspState::make_arc_consistent`], which strictly
    /// dominates it, and is kept for callers that want the cheaper pass.
    pub fn simplify_pre_assignment(&mut self, termination: &mut impl Termination) -> Result<()> {
        let names: Vec<VariableName> = self
            .variables
            .iter()
            .map(|variable| variable.name().clone())
            .collect();

        for name in names {
            checkpoint(termination)?;
            let Some(value) = self.variables.value_of(&name).cloned() else {
                continue;
            };

            for constraint in &self.constraints.filter_by_name(&name) {
                for other in constraint.vars().to_vec() {
                    if other == name {
                        continue;
                    }
                    let other_var =
                        self.variables
                            .find(&other)
                            .ok_or_else(|| Error::UnknownVariable {
                                name: other.clone(),
                            })?;
                    if !other_var.is_empty() || !other_var.domain().contains(&value) {
                        continue;
                    }

                    let before = constraint.holds(&self.variables);
                    self.variables.set_value(&other, value.clone());
                    let after = constraint.holds(&self.variables);
                    self.variables.unset(&other);

                    if before && !after {
                        let restricted = self
                            .variables
                            .find(&other)
                            .expect("checked above")
                            .domain()
                            .remove(&value);
                        let collapsed = if restricted.len() == 1 {
                            restricted.first().cloned()
                        } else {
                            None
                        };
                        self.variables.set_domain(&other, restricted);
                        if let Some(single) = collapsed {
                            self.variables.set_value(&other, single);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
