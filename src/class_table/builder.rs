use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, instrument, trace};

use crate::{
    ast::{
        ast::{Class, Feature, Method, Program},
        types::{Type, OBJECT, RESERVED_CLASS_NAMES, SELF_TYPE},
    },
    errors::errors::{Error, ErrorImpl, StructuralError},
    Position,
};

use super::class_table::{AttributeInfo, ClassRecord, ClassTable, MethodSignature};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Working state while the table is assembled.
struct HierarchyBuilder<'a> {
    program: &'a Program,
    table: ClassTable,
    /// First declaration of each program class, by name.
    declared: IndexMap<&'a str, usize>,
    /// Resolved parent of each declared class.
    parents: HashMap<&'a str, String>,
    errors: Vec<Error>,
}

impl<'a> HierarchyBuilder<'a> {
    fn new(program: &'a Program) -> Self {
        HierarchyBuilder {
            program,
            table: ClassTable::with_builtins(),
            declared: IndexMap::new(),
            parents: HashMap::new(),
            errors: vec![],
        }
    }

    fn error(&mut self, error: ErrorImpl, position: Position) {
        self.errors.push(Error::new(error, position));
    }

    fn class_at(&self, name: &str) -> Option<&'a Class> {
        let program = self.program;
        self.declared
            .get(name)
            .map(|&index| &program.classes[index])
    }

    /// Reserved names and repeated declarations. The first declaration of a
    /// name wins.
    fn register_classes(&mut self) {
        let program = self.program;

        for (index, class) in program.classes.iter().enumerate() {
            if RESERVED_CLASS_NAMES.contains(&class.name.as_str()) {
                self.error(
                    ErrorImpl::ReservedClassName {
                        class: class.name.clone(),
                    },
                    class.span.start,
                );
            } else if self.declared.contains_key(class.name.as_str()) {
                self.error(
                    ErrorImpl::ClassRedefined {
                        class: class.name.clone(),
                    },
                    class.span.start,
                );
            } else {
                self.declared.insert(class.name.as_str(), index);
            }
        }
    }

    /// Unknown and sealed parents are reported and replaced by `Object`.
    fn resolve_parents(&mut self) {
        let program = self.program;
        let declared: Vec<(&'a str, usize)> = self
            .declared
            .iter()
            .map(|(name, index)| (*name, *index))
            .collect();

        for (name, index) in declared {
            let class = &program.classes[index];
            let parent = class.parent.as_str();

            let resolved = if self.table.is_sealed(parent) {
                self.error(
                    ErrorImpl::SealedParent {
                        class: class.name.clone(),
                        parent: parent.to_string(),
                    },
                    class.span.start,
                );
                OBJECT
            } else if parent == SELF_TYPE
                || !(self.table.has_class(parent) || self.declared.contains_key(parent))
            {
                self.error(
                    ErrorImpl::UnknownParent {
                        class: class.name.clone(),
                        parent: parent.to_string(),
                    },
                    class.span.start,
                );
                OBJECT
            } else {
                parent
            };

            self.parents.insert(name, resolved.to_string());
        }
    }

    /// Reports each inheritance cycle once and excludes its classes, then
    /// excludes every class that inherits from a cycle.
    fn detect_cycles(&mut self) {
        let order: Vec<&'a str> = self.declared.keys().copied().collect();
        let mut state: HashMap<&str, Visit> = HashMap::new();
        let mut cyclic: IndexSet<String> = IndexSet::new();

        for &start in &order {
            if state.contains_key(start) {
                continue;
            }

            let mut path: Vec<&str> = vec![];
            let mut current = start;
            loop {
                match state.get(current).copied() {
                    None => {
                        state.insert(current, Visit::InProgress);
                        path.push(current);
                        // Chains end at a built-in class or run into a cycle.
                        let next = self
                            .parents
                            .get(current)
                            .and_then(|parent| self.declared.get_key_value(parent.as_str()));
                        match next {
                            Some((name, _)) => current = *name,
                            None => break,
                        }
                    }
                    Some(Visit::InProgress) => {
                        let entry = path.iter().position(|name| *name == current).unwrap_or(0);
                        let cycle: Vec<String> =
                            path[entry..].iter().map(|name| name.to_string()).collect();
                        debug!("inheritance cycle {:?}", cycle);

                        let position = self
                            .class_at(path[entry])
                            .map_or(Position::null(), |class| class.span.start);
                        cyclic.extend(cycle.iter().cloned());
                        self.error(ErrorImpl::InheritanceCycle { cycle }, position);
                        break;
                    }
                    Some(Visit::Done) => break,
                }
            }

            for name in path {
                state.insert(name, Visit::Done);
            }
        }

        for name in &cyclic {
            self.table.exclude(name);
        }

        for &name in &order {
            if cyclic.contains(name) {
                continue;
            }

            let mut current = self.parents.get(name).cloned();
            while let Some(ancestor) = current {
                if cyclic.contains(&ancestor) {
                    let position = self
                        .class_at(name)
                        .map_or(Position::null(), |class| class.span.start);
                    self.error(
                        ErrorImpl::InheritsFromCycle {
                            class: name.to_string(),
                            ancestor: ancestor.clone(),
                        },
                        position,
                    );
                    self.table.exclude(name);
                    break;
                }
                current = self.parents.get(ancestor.as_str()).cloned();
            }
        }
    }

    /// Adds the remaining program classes, parents before children.
    fn flatten(&mut self) {
        let mut pending: Vec<&'a str> = self
            .declared
            .keys()
            .copied()
            .filter(|name| !self.table.is_excluded(name))
            .collect();

        while !pending.is_empty() {
            let (ready, waiting): (Vec<&'a str>, Vec<&'a str>) = pending
                .into_iter()
                .partition(|name| self.parent_of(name).map_or(false, |p| self.table.has_class(p)));

            if ready.is_empty() {
                break;
            }
            for name in ready {
                self.flatten_class(name);
            }
            pending = waiting;
        }
    }

    fn parent_of(&self, name: &str) -> Option<&str> {
        self.parents.get(name).map(String::as_str)
    }

    fn flatten_class(&mut self, name: &'a str) {
        let Some(class) = self.class_at(name) else {
            return;
        };
        let parent = self.parent_of(name).unwrap_or(OBJECT).to_string();
        let Some(parent_record) = self.table.get_class(&parent) else {
            return;
        };

        let mut attributes = parent_record.attributes.clone();
        let mut methods = parent_record.methods.clone();
        let declaration = self.declared.get(name).copied();

        // Registered first so that override checks can see this class's own
        // ancestry.
        self.table.insert(ClassRecord {
            name: name.to_string(),
            parent: Some(parent),
            attributes: vec![],
            methods: IndexMap::new(),
            declaration,
        });

        let mut own_attributes: HashSet<&str> = HashSet::new();
        let mut own_methods: HashSet<&str> = HashSet::new();

        for feature in &class.features {
            match feature {
                Feature::Attribute(attribute) => {
                    let position = attribute.span.start;
                    if attribute.name == "self" {
                        self.error(
                            ErrorImpl::IllegalSelfBinding {
                                context: String::from("an attribute"),
                            },
                            position,
                        );
                    } else if !own_attributes.insert(attribute.name.as_str()) {
                        self.error(
                            ErrorImpl::AttributeRedefined {
                                class: class.name.clone(),
                                attribute: attribute.name.clone(),
                            },
                            position,
                        );
                    } else if let Some(inherited) =
                        attributes.iter().find(|info| info.name == attribute.name)
                    {
                        let ancestor = inherited.defined_in.clone();
                        self.error(
                            ErrorImpl::InheritedAttributeRedefined {
                                class: class.name.clone(),
                                attribute: attribute.name.clone(),
                                ancestor,
                            },
                            position,
                        );
                    } else {
                        attributes.push(AttributeInfo {
                            name: attribute.name.clone(),
                            type_name: attribute.type_name.clone(),
                            defined_in: class.name.clone(),
                        });
                    }
                }
                Feature::Method(method) => {
                    if !own_methods.insert(method.name.as_str()) {
                        self.error(
                            ErrorImpl::MethodRedefined {
                                class: class.name.clone(),
                                method: method.name.clone(),
                            },
                            method.span.start,
                        );
                        continue;
                    }

                    self.check_formals(method);
                    let signature = MethodSignature {
                        name: method.name.clone(),
                        formals: method
                            .formals
                            .iter()
                            .map(|formal| (formal.name.clone(), formal.type_name.clone()))
                            .collect(),
                        return_type: method.return_type.clone(),
                        defined_in: class.name.clone(),
                    };

                    if let Some(inherited) = methods.get(&method.name) {
                        if let Some(reason) = self.override_mismatch(&class.name, inherited, &signature) {
                            let ancestor = inherited.defined_in.clone();
                            self.error(
                                ErrorImpl::OverrideMismatch {
                                    class: class.name.clone(),
                                    method: method.name.clone(),
                                    ancestor,
                                    reason,
                                },
                                method.span.start,
                            );
                            continue;
                        }
                    }

                    methods.insert(method.name.clone(), signature);
                }
            }
        }

        trace!(
            "flattened {}: {} attributes, {} methods",
            name,
            attributes.len(),
            methods.len()
        );
        if let Some(record) = self.table.get_class_mut(name) {
            record.attributes = attributes;
            record.methods = methods;
        }
    }

    fn check_formals(&mut self, method: &Method) {
        let mut seen: HashSet<&str> = HashSet::new();

        for formal in &method.formals {
            let position = formal.span.start;
            if formal.name == "self" {
                self.error(
                    ErrorImpl::IllegalSelfBinding {
                        context: String::from("a formal parameter"),
                    },
                    position,
                );
            } else if !seen.insert(formal.name.as_str()) {
                self.error(
                    ErrorImpl::FormalRedefined {
                        method: method.name.clone(),
                        formal: formal.name.clone(),
                    },
                    position,
                );
            }

            if formal.type_name == SELF_TYPE {
                self.error(
                    ErrorImpl::SelfTypeFormal {
                        method: method.name.clone(),
                        formal: formal.name.clone(),
                    },
                    position,
                );
            }
        }
    }

    /// Why `overriding` may not replace `inherited`, if it may not.
    fn override_mismatch(
        &self,
        class_name: &str,
        inherited: &MethodSignature,
        overriding: &MethodSignature,
    ) -> Option<String> {
        if inherited.arity() != overriding.arity() {
            return Some(format!(
                "expected {} formal parameters, found {}",
                inherited.arity(),
                overriding.arity()
            ));
        }

        for (index, (expected, found)) in inherited
            .formal_types()
            .zip(overriding.formal_types())
            .enumerate()
        {
            if expected != found {
                return Some(format!(
                    "formal parameter {} has type {}, expected {}",
                    index + 1,
                    found,
                    expected
                ));
            }
        }

        let expected = Type::from_annotation(&inherited.return_type, class_name);
        let found = Type::from_annotation(&overriding.return_type, class_name);
        let conforms = match (&found, &expected) {
            (Type::SelfType(a), Type::SelfType(b)) => a == b,
            (_, Type::SelfType(_)) => false,
            (sub, Type::Class(ancestor)) => sub
                .class_name()
                .map_or(false, |name| self.ancestry(name).iter().any(|class| class == ancestor)),
            _ => true,
        };
        if !conforms {
            return Some(format!(
                "return type {} does not conform to {}",
                overriding.return_type, inherited.return_type
            ));
        }

        None
    }

    /// `class_name` and its ancestors, nearest first.
    ///
    /// Follows resolved parents rather than the table, so classes that are
    /// declared but not flattened yet are included.
    fn ancestry(&self, class_name: &str) -> Vec<String> {
        let mut chain: Vec<String> = vec![];
        let mut current = Some(class_name.to_string());
        let limit = self.declared.len() + self.table.len();

        while let Some(name) = current {
            if chain.len() > limit || chain.contains(&name) {
                break;
            }
            current = match self.parents.get(name.as_str()) {
                Some(parent) => Some(parent.clone()),
                None => self
                    .table
                    .get_class(&name)
                    .and_then(|record| record.parent.clone()),
            };
            chain.push(name);
        }

        chain
    }

    fn finish(self) -> (ClassTable, Vec<Error>) {
        (self.table, self.errors)
    }
}

/// Builds and validates the class table for `program`.
///
/// Every problem with the hierarchy is reported, and the table is still
/// built from what remains: bad parents become `Object`, cyclic classes and
/// their descendants are left out, rejected features are skipped.
#[instrument(skip_all)]
pub fn build(program: &Program) -> Result<(ClassTable, Vec<Error>), StructuralError> {
    if program.classes.is_empty() {
        return Err(StructuralError::EmptyProgram);
    }

    let mut builder = HierarchyBuilder::new(program);
    builder.register_classes();
    builder.resolve_parents();
    builder.detect_cycles();
    builder.flatten();

    let (table, errors) = builder.finish();
    debug!(
        "class table has {} classes, {} excluded, {} errors",
        table.len(),
        table.excluded().count(),
        errors.len()
    );
    Ok((table, errors))
}
