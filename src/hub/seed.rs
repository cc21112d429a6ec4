use tracing::debug;

use crate::resources::{HandleRegistry, ResourceTree, TreeError};
use crate::upload::FilePayload;

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// (folder, file, size, media type)
const DEMO_DATASET: [(&str, &str, usize, &str); 3] = [
    ("Course Materials", "Syllabus.pdf", 102_400, "application/pdf"),
    ("ECA", "Event Schedule.xlsx", 25_600, XLSX),
    ("Assignments", "DSP_Assignment_1.pdf", 5_120, "application/pdf"),
];

/// Populates an empty tree with the demo folders, one file in each.
pub fn seed_demo<H: HandleRegistry>(tree: &mut ResourceTree<H>) -> Result<(), TreeError> {
    for (folder, file, size, media_type) in DEMO_DATASET {
        let folder_id = tree.create_folder(folder, None)?.id();
        tree.create_file(FilePayload::new(file, media_type, vec![0; size]), Some(folder_id))?;
    }
    debug!("Seeded {} demo nodes", tree.store().len());
    Ok(())
}
