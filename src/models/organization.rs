//! Organization chart model and tree operations.
//!
//! The chart is stored as a single document holding the whole tree. Trees are
//! small (one node per department and employee), so every operation here is a
//! plain recursive walk.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_non_empty, Department, Employee, Record, Resource};
use crate::errors::AppError;

/// ID of the synthetic company node at the top of every chart.
pub const ROOT_NODE_ID: &str = "ORG-ROOT";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Company,
    Department,
    Employee,
}

/// A node of the organization chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationNode {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub node_type: NodeType,
    #[serde(default)]
    pub children: Vec<OrganizationNode>,
    /// Number of children omitted from a collapsed view.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub hidden_children: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl OrganizationNode {
    fn leaf(id: &str, name: String, title: Option<String>, node_type: NodeType) -> Self {
        Self {
            id: id.to_string(),
            name,
            title,
            node_type,
            children: Vec::new(),
            hidden_children: 0,
        }
    }

    /// IDs from this node down to `id`, both included.
    ///
    /// Expanding every node on the path reveals the target.
    pub fn path_to(&self, id: &str) -> Option<Vec<String>> {
        if self.id == id {
            return Some(vec![self.id.clone()]);
        }
        for child in &self.children {
            if let Some(mut path) = child.path_to(id) {
                path.insert(0, self.id.clone());
                return Some(path);
            }
        }
        None
    }

    /// Depth of the subtree; a lone node has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Copy of the tree where only expanded nodes keep their children.
    ///
    /// A node is expanded when its ID is in `expanded` or it sits above
    /// `max_depth` (the root is level 0). Collapsed nodes report how many
    /// children were hidden.
    pub fn collapsed_view(&self, expanded: &HashSet<String>, max_depth: Option<usize>) -> Self {
        self.view_at(expanded, max_depth, 0)
    }

    fn view_at(&self, expanded: &HashSet<String>, max_depth: Option<usize>, level: usize) -> Self {
        let open = expanded.contains(&self.id) || max_depth.is_some_and(|d| level < d);
        let mut node = self.clone_shallow();
        if open {
            node.children = self
                .children
                .iter()
                .map(|c| c.view_at(expanded, max_depth, level + 1))
                .collect();
        } else {
            node.hidden_children = self.children.len();
        }
        node
    }

    fn clone_shallow(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            title: self.title.clone(),
            node_type: self.node_type,
            children: Vec::new(),
            hidden_children: 0,
        }
    }

    fn count_employees(&self) -> usize {
        let own = usize::from(self.node_type == NodeType::Employee);
        own + self.children.iter().map(|c| c.count_employees()).sum::<usize>()
    }
}

/// Aggregate figures over a chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationStats {
    pub total_nodes: usize,
    pub departments: usize,
    pub employees: usize,
    pub max_depth: usize,
    /// Largest number of direct children under one node.
    pub widest_span: usize,
    /// Employees in each department's whole subtree.
    pub headcount_by_department: BTreeMap<String, usize>,
}

impl OrganizationStats {
    pub fn collect(root: &OrganizationNode) -> Self {
        let mut stats = OrganizationStats {
            total_nodes: 0,
            departments: 0,
            employees: 0,
            max_depth: root.depth(),
            widest_span: 0,
            headcount_by_department: BTreeMap::new(),
        };
        stats.visit(root);
        stats
    }

    fn visit(&mut self, node: &OrganizationNode) {
        self.total_nodes += 1;
        self.widest_span = self.widest_span.max(node.children.len());
        match node.node_type {
            NodeType::Department => {
                self.departments += 1;
                self.headcount_by_department
                    .insert(node.id.clone(), node.count_employees());
            }
            NodeType::Employee => self.employees += 1,
            NodeType::Company => {}
        }
        for child in &node.children {
            self.visit(child);
        }
    }
}

/// The stored organization chart document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationChart {
    pub name: String,
    pub root: OrganizationNode,
    pub generated_at: DateTime<Utc>,
}

impl Resource for OrganizationChart {
    const COLLECTION: &'static str = "organization_chart";
    const ID_PREFIX: &'static str = "ORG";
    const LABEL: &'static str = "Organization chart";

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.name, "Chart name")
    }
}

impl OrganizationChart {
    /// Build the chart from departments and employees.
    ///
    /// Departments hang under their parent, or under the company node when
    /// they have none or it is unknown. Departments caught in a parent cycle
    /// are attached to the company node. Employees sit under their department
    /// (managers of the department first); employees of unknown departments
    /// are attached to the company node.
    pub fn build(
        company_name: &str,
        departments: &[Record<Department>],
        employees: &[Record<Employee>],
    ) -> Self {
        let known: HashSet<&str> = departments.iter().map(|d| d.id.as_str()).collect();
        let by_id: HashMap<&str, &Record<Department>> =
            departments.iter().map(|d| (d.id.as_str(), d)).collect();
        let employee_names: HashMap<&str, String> = employees
            .iter()
            .map(|e| (e.id.as_str(), e.data.display_name()))
            .collect();

        let mut child_departments: HashMap<Option<&str>, Vec<&str>> = HashMap::new();
        for dept in departments {
            let parent = dept
                .data
                .parent_department_id
                .as_deref()
                .filter(|p| known.contains(p) && *p != dept.id);
            child_departments
                .entry(parent)
                .or_default()
                .push(dept.id.as_str());
        }

        let mut staff: HashMap<&str, Vec<&Record<Employee>>> = HashMap::new();
        let mut unassigned = Vec::new();
        for emp in employees {
            if known.contains(emp.data.department_id.as_str()) {
                staff
                    .entry(emp.data.department_id.as_str())
                    .or_default()
                    .push(emp);
            } else {
                unassigned.push(emp);
            }
        }

        let ctx = BuildContext {
            by_id: &by_id,
            child_departments: &child_departments,
            staff: &staff,
            employee_names: &employee_names,
        };

        let mut visited = HashSet::new();
        let mut root = OrganizationNode::leaf(
            ROOT_NODE_ID,
            company_name.to_string(),
            None,
            NodeType::Company,
        );
        for id in child_departments.get(&None).into_iter().flatten() {
            root.children.push(ctx.department_node(*id, &mut visited));
        }
        // Whatever is still unvisited only reaches itself through a cycle.
        for dept in departments {
            if !visited.contains(dept.id.as_str()) {
                root.children
                    .push(ctx.department_node(dept.id.as_str(), &mut visited));
            }
        }
        root.children.extend(unassigned.into_iter().map(employee_node));

        OrganizationChart {
            name: format!("{} organization chart", company_name),
            root,
            generated_at: Utc::now(),
        }
    }

    pub fn stats(&self) -> OrganizationStats {
        OrganizationStats::collect(&self.root)
    }
}

struct BuildContext<'a> {
    by_id: &'a HashMap<&'a str, &'a Record<Department>>,
    child_departments: &'a HashMap<Option<&'a str>, Vec<&'a str>>,
    staff: &'a HashMap<&'a str, Vec<&'a Record<Employee>>>,
    employee_names: &'a HashMap<&'a str, String>,
}

impl<'a> BuildContext<'a> {
    fn department_node(&self, id: &'a str, visited: &mut HashSet<&'a str>) -> OrganizationNode {
        visited.insert(id);
        let dept = self.by_id[id];
        let title = dept
            .data
            .manager_id
            .as_deref()
            .and_then(|m| self.employee_names.get(m).cloned());
        let mut node =
            OrganizationNode::leaf(id, dept.data.name.clone(), title, NodeType::Department);

        if let Some(children) = self.child_departments.get(&Some(id)) {
            for child in children {
                if !visited.contains(child) {
                    node.children.push(self.department_node(*child, visited));
                }
            }
        }

        if let Some(members) = self.staff.get(id) {
            let mut members = members.clone();
            let manager = dept.data.manager_id.as_deref();
            members.sort_by_key(|e| (Some(e.id.as_str()) != manager, e.id.clone()));
            node.children.extend(members.into_iter().map(employee_node));
        }
        node
    }
}

fn employee_node(emp: &Record<Employee>) -> OrganizationNode {
    OrganizationNode::leaf(
        &emp.id,
        emp.data.display_name(),
        Some(emp.data.position.clone()),
        NodeType::Employee,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmploymentType, SystemInfo};
    use chrono::NaiveDate;

    fn info() -> SystemInfo {
        SystemInfo {
            created_by: "test".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_by: "test".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            is_active: true,
            version: 1,
        }
    }

    fn dept(id: &str, parent: Option<&str>) -> Record<Department> {
        Record {
            id: id.to_string(),
            data: Department {
                name: format!("Dept {}", id),
                name_ar: None,
                description: None,
                parent_department_id: parent.map(str::to_string),
                manager_id: None,
                location: None,
                budget: None,
            },
            system_info: info(),
        }
    }

    fn emp(id: &str, department: &str) -> Record<Employee> {
        Record {
            id: id.to_string(),
            data: Employee {
                first_name: "First".to_string(),
                last_name: id.to_string(),
                full_name_ar: None,
                email: format!("{}@example.com", id.to_lowercase()),
                phone: None,
                department_id: department.to_string(),
                position: "Staff".to_string(),
                manager_id: None,
                hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                employment_type: EmploymentType::FullTime,
                gender: None,
                national_id: None,
                basic_salary: 1000.0,
                currency: "EGP".to_string(),
            },
            system_info: info(),
        }
    }

    fn sample() -> OrganizationChart {
        let departments = vec![
            dept("DEP001", None),
            dept("DEP002", Some("DEP001")),
            dept("DEP003", Some("DEP002")),
            dept("DEP004", Some("DEP001")),
        ];
        let employees = vec![
            emp("EMP001", "DEP001"),
            emp("EMP002", "DEP003"),
            emp("EMP003", "DEP003"),
            emp("EMP004", "DEP004"),
        ];
        OrganizationChart::build("Acme", &departments, &employees)
    }

    #[test]
    fn test_build_nests_departments_and_staff() {
        let chart = sample();
        assert_eq!(chart.root.id, ROOT_NODE_ID);
        assert_eq!(chart.root.children.len(), 1);
        let top = &chart.root.children[0];
        assert_eq!(top.id, "DEP001");
        assert!(chart.root.path_to("EMP002").is_some());
        assert_eq!(
            chart.root.path_to("EMP002").unwrap(),
            vec!["ORG-ROOT", "DEP001", "DEP002", "DEP003", "EMP002"]
        );
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.departments, 4);
        assert_eq!(stats.employees, 4);
        assert_eq!(stats.total_nodes, 9);
        // root > DEP001 > DEP002 > DEP003 > EMP
        assert_eq!(stats.max_depth, 5);
        assert_eq!(stats.headcount_by_department["DEP001"], 4);
        assert_eq!(stats.headcount_by_department["DEP002"], 2);
        assert_eq!(stats.headcount_by_department["DEP004"], 1);
        assert_eq!(stats.widest_span, 3);
    }

    #[test]
    fn test_collapsed_view_hides_children() {
        let chart = sample();
        let view = chart.root.collapsed_view(&HashSet::new(), Some(1));
        assert_eq!(view.children.len(), 1);
        let top = &view.children[0];
        assert!(top.children.is_empty());
        assert_eq!(top.hidden_children, 3);

        let expanded: HashSet<String> = ["DEP001".to_string()].into_iter().collect();
        let view = chart.root.collapsed_view(&expanded, Some(1));
        assert_eq!(view.children[0].children.len(), 3);
    }

    #[test]
    fn test_cycle_does_not_loop() {
        let departments = vec![dept("DEP001", Some("DEP002")), dept("DEP002", Some("DEP001"))];
        let chart = OrganizationChart::build("Acme", &departments, &[]);
        let stats = chart.stats();
        assert_eq!(stats.departments, 2);
    }

    #[test]
    fn test_unknown_parent_attaches_to_root() {
        let departments = vec![dept("DEP001", Some("DEP999"))];
        let employees = vec![emp("EMP001", "DEP404")];
        let chart = OrganizationChart::build("Acme", &departments, &employees);
        let ids: Vec<&str> = chart.root.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["DEP001", "EMP001"]);
    }
}
