/// Hands out unique label names for one generation run. Every label shares a
/// single counter, so `if_end0` and `while_top1` can never collide.
pub struct LabelGenerator {
    count: usize,
}
impl LabelGenerator {
    pub fn new() -> Self {
        LabelGenerator {
            count: 0,
        }
    }

    pub fn get_label(&mut self, name: &str) -> String {
        let label = format!("{}{}", name, self.count);
        self.count += 1;
        label
    }
}
