use crate::cli::{Command, OutputArgs};
use log::{debug, info};
use mosaic_core::geometry::Bounds;
use mosaic_core::tree::serialization::{load_layout, save_layout, to_yaml};
use mosaic_core::tree::{
    compute_leaf_bounds, format_path, get_leaves, get_node_at_path, get_path_to_corner, parse_path, MosaicTree,
};
use mosaic_core::{Config, MosaicBackend, MosaicResult};
use std::path::Path;
use std::rc::Rc;

/// Pane identifiers in layout files
pub type PaneId = u64;

pub fn run(command: &Command, config: Config) -> MosaicResult<()> {
    match command {
        Command::Show { layout, width, height } => {
            let tree = load(&layout.layout)?;
            print!("{}", describe(&tree, *width, *height));
        }
        Command::Leaves { layout } => {
            let tree = load(&layout.layout)?;
            for leaf in get_leaves(tree.as_deref()) {
                println!("{leaf}");
            }
        }
        Command::Corner { layout, corner } => {
            let tree = load(&layout.layout)?;
            let root = tree.ok_or("The layout is empty")?;
            let path = get_path_to_corner(&root, (*corner).into());
            let leaf = get_node_at_path(&root, &path)
                .and_then(|node| node.as_leaf())
                .ok_or("Corner path did not end at a pane")?;
            println!("{}\t{}", format_path(&path), leaf);
        }
        Command::Arrange { layout, output } => {
            let mut backend = open_backend(&layout.layout, config)?;
            backend.auto_arrange();
            write_output(backend.tree(), output)?;
        }
        Command::Add { layout, corner, output } => {
            let mut backend = open_backend(&layout.layout, config)?;
            backend.add_pane_at_corner((*corner).into())?;
            write_output(backend.tree(), output)?;
        }
        Command::Move {
            layout,
            from,
            to,
            side,
            output,
        } => {
            let mut backend = open_backend(&layout.layout, config)?;
            backend.move_pane(&parse_path(from)?, &parse_path(to)?, (*side).into())?;
            write_output(backend.tree(), output)?;
        }
        Command::Split {
            layout,
            path,
            direction,
            output,
        } => {
            let mut backend = open_backend(&layout.layout, config)?;
            backend.split_pane(&parse_path(path)?, (*direction).into())?;
            write_output(backend.tree(), output)?;
        }
        Command::Remove { layout, path, output } => {
            let mut backend = open_backend(&layout.layout, config)?;
            backend.remove_pane(&parse_path(path)?)?;
            write_output(backend.tree(), output)?;
        }
    }

    Ok(())
}

fn load(path: &Path) -> MosaicResult<MosaicTree<PaneId>> {
    let tree = load_layout(path)?;
    debug!("Loaded layout from {}", path.display());
    Ok(tree)
}

/// New panes get ids after the largest one in the layout.
fn open_backend(path: &Path, config: Config) -> MosaicResult<MosaicBackend<PaneId>> {
    let tree = load(path)?;
    let mut next_id = get_leaves(tree.as_deref()).into_iter().max().map_or(1, |max| max + 1);
    Ok(MosaicBackend::new(Rc::new(config), tree, move || {
        let id = next_id;
        next_id += 1;
        id
    }))
}

fn write_output(tree: &MosaicTree<PaneId>, output: &OutputArgs) -> MosaicResult<()> {
    match &output.output {
        Some(path) => {
            save_layout(path, tree)?;
            info!("Wrote layout to {}", path.display());
        }
        None => print!("{}", to_yaml(tree)?),
    }
    Ok(())
}

fn describe(tree: &MosaicTree<PaneId>, width: u32, height: u32) -> String {
    let Some(root) = tree else {
        return "(empty layout)\n".to_owned();
    };

    compute_leaf_bounds(root, &Bounds::new(0, 0, width, height))
        .into_iter()
        .map(|(path, id, bounds)| {
            format!(
                "{id}\t{}\t{},{} {}x{}\n",
                format_path(&path),
                bounds.position.x,
                bounds.position.y,
                bounds.size.width,
                bounds.size.height
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{CornerArg, LayoutArgs, SideArg};
    use mosaic_core::tree::serialization::from_yaml;
    use std::fs;
    use std::path::PathBuf;

    const SCENARIO: &str = "direction: row\nfirst: 1\nsecond:\n  direction: column\n  first: 2\n  second: 3\nsplitPercentage: 40\n";

    fn temp_layout(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mosaic-cli-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("layout.yaml");
        fs::write(&path, SCENARIO).unwrap();
        path
    }

    fn read_output(path: &Path) -> MosaicTree<PaneId> {
        from_yaml(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_describe() {
        let tree = from_yaml(SCENARIO).unwrap();
        assert_eq!(
            describe(&tree, 1000, 800),
            "1\tfirst\t0,0 400x800\n2\tsecond.first\t400,0 600x400\n3\tsecond.second\t400,400 600x400\n"
        );
        assert_eq!(describe(&None, 10, 10), "(empty layout)\n");
    }

    #[test]
    fn test_add_assigns_next_id() {
        let input = temp_layout("add");
        let output = input.with_file_name("out.yaml");
        let command = Command::Add {
            layout: LayoutArgs { layout: input.clone() },
            corner: CornerArg::TopRight,
            output: OutputArgs {
                output: Some(output.clone()),
            },
        };
        run(&command, Config::default()).unwrap();

        let tree = read_output(&output);
        assert_eq!(get_leaves(tree.as_deref()), vec![1, 2, 4, 3]);
        let _ = fs::remove_dir_all(input.parent().unwrap());
    }

    #[test]
    fn test_move_writes_json() {
        let input = temp_layout("move");
        let output = input.with_file_name("out.json");
        let command = Command::Move {
            layout: LayoutArgs { layout: input.clone() },
            from: "second.second".to_owned(),
            to: "first".to_owned(),
            side: SideArg::Left,
            output: OutputArgs {
                output: Some(output.clone()),
            },
        };
        run(&command, Config::default()).unwrap();

        let tree: MosaicTree<PaneId> = load_layout(&output).unwrap();
        assert_eq!(get_leaves(tree.as_deref()), vec![3, 1, 2]);
        let _ = fs::remove_dir_all(input.parent().unwrap());
    }

    #[test]
    fn test_invalid_path_is_reported() {
        let input = temp_layout("remove");
        let command = Command::Remove {
            layout: LayoutArgs { layout: input.clone() },
            path: "first.left".to_owned(),
            output: OutputArgs { output: None },
        };
        assert!(run(&command, Config::default()).is_err());
        let _ = fs::remove_dir_all(input.parent().unwrap());
    }
}
