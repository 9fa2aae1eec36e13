use crate::error::Result;
use crate::types::{Scope, Selection, Slo};

/// SLOs sharing a project, or a service within a project.
#[derive(Debug, Clone)]
pub struct Group {
    pub scope: Scope,
    pub slos: Vec<Slo>,
}

impl Group {
    pub fn label(&self) -> String {
        match &self.scope {
            Scope::Project(p) => p.clone(),
            Scope::Service { project, service } => format!("{service} ({project})"),
            Scope::Custom => "custom".to_string(),
        }
    }

    /// The group's SLOs as a selection ordered by `(project, name)`.
    pub fn to_selection(&self) -> Result<Selection> {
        Selection::sorted(self.scope.clone(), self.slos.iter().cloned())
    }
}

/// Everything `sloctl get slos` returned, with project and service views.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    slos: Vec<Slo>,
}

impl Catalog {
    pub fn new(slos: Vec<Slo>) -> Self {
        Self { slos }
    }

    pub fn slos(&self) -> &[Slo] {
        &self.slos
    }

    pub fn is_empty(&self) -> bool {
        self.slos.is_empty()
    }

    /// Projects in first-seen order.
    pub fn projects(&self) -> Vec<Group> {
        self.group_by(|s| Some(Scope::Project(s.project.clone())))
    }

    /// Services in first-seen order. Service names are only unique within a
    /// project, so `api` in `prod` and `api` in `staging` are separate groups.
    /// SLOs without a service are left out.
    pub fn services(&self) -> Vec<Group> {
        self.group_by(|s| {
            (!s.service.is_empty()).then(|| Scope::Service {
                project: s.project.clone(),
                service: s.service.clone(),
            })
        })
    }

    /// Ad-hoc selection by 0-based indices into [`Catalog::slos`], in the
    /// order given. Out-of-range indices are ignored.
    pub fn pick(&self, indices: &[usize]) -> Result<Selection> {
        Selection::new(
            Scope::Custom,
            indices.iter().filter_map(|&i| self.slos.get(i).cloned()),
        )
    }

    fn group_by(&self, key: impl Fn(&Slo) -> Option<Scope>) -> Vec<Group> {
        let mut groups: Vec<Group> = Vec::new();
        for slo in &self.slos {
            let Some(scope) = key(slo) else {
                continue;
            };
            match groups.iter_mut().find(|g| g.scope == scope) {
                Some(group) => group.slos.push(slo.clone()),
                None => groups.push(Group {
                    scope,
                    slos: vec![slo.clone()],
                }),
            }
        }
        groups
    }
}
