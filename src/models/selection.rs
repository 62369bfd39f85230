use std::collections::HashMap;

use super::batch::Candidate;

/// 勾选集合：考生 ID → 是否参与下一次批量操作
///
/// "全选" 只在点击的那一刻与各行一致，之后单独取消某行不会回写全选状态。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: HashMap<String, bool>,
    select_all: bool,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换单个考生
    pub fn toggle(&mut self, candidate_id: &str) -> bool {
        let entry = self.selected.entry(candidate_id.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn set(&mut self, candidate_id: &str, selected: bool) {
        self.selected.insert(candidate_id.to_string(), selected);
    }

    /// 用当前考生列表整体覆盖勾选状态
    pub fn set_all(&mut self, candidates: &[Candidate], selected: bool) {
        self.select_all = selected;
        self.selected = candidates
            .iter()
            .map(|c| (c.id.clone(), selected))
            .collect();
    }

    /// 切换全选，返回全选框的新状态
    pub fn toggle_all(&mut self, candidates: &[Candidate]) -> bool {
        self.set_all(candidates, !self.select_all);
        self.select_all
    }

    pub fn is_selected(&self, candidate_id: &str) -> bool {
        self.selected.get(candidate_id).copied().unwrap_or(false)
    }

    /// 全选复选框的显示状态
    pub fn select_all(&self) -> bool {
        self.select_all
    }

    /// 按给定顺序过滤出被勾选的考生
    pub fn selected_in<'a>(&self, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
        candidates
            .iter()
            .filter(|c| self.is_selected(&c.id))
            .collect()
    }

    pub fn selected_count(&self, candidates: &[Candidate]) -> usize {
        self.selected_in(candidates).len()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.select_all = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            enrollment_no: format!("EN-{}", id),
            name: id.to_uppercase(),
        }
    }

    #[test]
    fn test_select_all_then_individual_toggle_diverges() {
        let candidates = vec![candidate("c1"), candidate("c2")];
        let mut selection = SelectionSet::new();

        assert!(selection.toggle_all(&candidates));
        assert_eq!(selection.selected_count(&candidates), 2);

        selection.toggle("c2");
        assert!(selection.select_all());
        assert_eq!(selection.selected_count(&candidates), 1);
    }

    #[test]
    fn test_selected_in_keeps_fetch_order() {
        let candidates = vec![candidate("c1"), candidate("c2"), candidate("c3")];
        let mut selection = SelectionSet::new();
        selection.toggle("c3");
        selection.toggle("c1");

        let ids: Vec<&str> = selection
            .selected_in(&candidates)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c1", "c3"]);
    }

    #[test]
    fn test_set_all_overwrites_individual_choices() {
        let candidates = vec![candidate("c1"), candidate("c2")];
        let mut selection = SelectionSet::new();
        selection.set("c1", true);

        selection.set_all(&candidates, false);
        assert!(!selection.is_selected("c1"));
        assert!(!selection.select_all());

        assert!(selection.toggle_all(&candidates));
        assert!(!selection.toggle_all(&candidates));
        assert_eq!(selection.selected_count(&candidates), 0);
    }
}
