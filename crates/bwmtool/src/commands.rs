// commands.rs - single-file subcommands

use std::fs;
use std::io::Write;

use anyhow::Context;
use serde::Serialize;
use walkmesh::{BwmAdjacency, BwmBinaryReader, BwmEdge, FlatAabb, Walkmesh, write_bwm};

use crate::{DumpArgs, FaceAtArgs, PathArgs, RewriteArgs, TransformArgs, WalkmeshArgs};

fn load(args: &WalkmeshArgs) -> anyhow::Result<Walkmesh> {
    BwmBinaryReader::from_file(&args.file, args.offset, args.size)
        .with_context(|| format!("Failed to load walkmesh {}", args.file.display()))
}

pub fn run_info(args: &WalkmeshArgs) -> anyhow::Result<()> {
    let wok = load(args)?;
    let edges = wok.edges();
    let perimeters = wok.perimeters();

    println!("File:        {}", args.file.display());
    println!("Type:        {:?}", wok.walkmesh_type);
    println!("Faces:       {}", wok.faces.len());
    println!("Walkable:    {}", wok.walkable_faces().len());
    println!("Vertices:    {}", wok.vertices().len());
    println!("Edges:       {}", edges.len());
    println!("Perimeters:  {}", perimeters.len());
    match wok.aabbs() {
        Ok(nodes) => println!("AABB nodes:  {}", nodes.len()),
        Err(err) => {
            tracing::warn!("AABB tree of {} cannot be built: {}", args.file.display(), err);
            println!("AABB nodes:  -");
        }
    }
    if let Some((lo, hi)) = wok.bounding_box() {
        println!(
            "Bounds:      ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
            lo.x, lo.y, lo.z, hi.x, hi.y, hi.z
        );
    }
    Ok(())
}

/// Everything `dump` emits: the stored model plus what a writer would derive
#[derive(Serialize)]
struct DumpDocument<'a> {
    walkmesh: &'a Walkmesh,
    walkable_faces: Vec<usize>,
    adjacencies: Vec<[Option<BwmAdjacency>; 3]>,
    edges: Vec<BwmEdge>,
    perimeters: Vec<usize>,
    aabbs: Vec<FlatAabb>,
}

pub fn run_dump(args: &DumpArgs) -> anyhow::Result<()> {
    let wok = load(&args.input)?;
    let doc = DumpDocument {
        walkmesh: &wok,
        walkable_faces: wok.walkable_faces(),
        adjacencies: wok.adjacency_table(),
        edges: wok.edges(),
        perimeters: wok.perimeters(),
        aabbs: wok.aabbs().context("Failed to build AABB tree")?,
    };
    let json = serde_json::to_string_pretty(&doc)?;

    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Dumped {} to {}", args.input.file.display(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

pub fn run_rewrite(args: &RewriteArgs) -> anyhow::Result<()> {
    let wok = load(&args.input)?;
    write_bwm(&wok, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!(
        "Rewrote {} -> {} ({} faces)",
        args.input.file.display(),
        args.output.display(),
        wok.faces.len()
    );
    Ok(())
}

pub fn run_face_at(args: &FaceAtArgs) -> anyhow::Result<()> {
    let wok = load(&args.input)?;
    match wok.face_at(args.x, args.y) {
        Some(idx) => {
            let face = &wok.faces[idx];
            println!(
                "{} {} walkable={} z={:.3}",
                idx,
                face.material,
                face.walkable(),
                face.centre().z
            );
        }
        None => println!("none"),
    }
    Ok(())
}

pub fn run_path(args: &PathArgs) -> anyhow::Result<()> {
    let wok = load(&args.input)?;
    for (name, idx) in [("start", args.start), ("goal", args.goal)] {
        anyhow::ensure!(
            idx < wok.faces.len(),
            "{} face {} out of range (walkmesh has {} faces)",
            name,
            idx,
            wok.faces.len()
        );
    }

    match wok.find_path(args.start, args.goal) {
        Some(path) => {
            let faces: Vec<String> = path.iter().map(|idx| idx.to_string()).collect();
            println!("{}", faces.join(" "));
        }
        None => {
            tracing::warn!("No walkable path from face {} to face {}", args.start, args.goal);
            println!("none");
        }
    }
    Ok(())
}

pub fn run_transform(args: &TransformArgs) -> anyhow::Result<()> {
    let mut wok = load(&args.input)?;
    apply_transform(&mut wok, args);
    write_bwm(&wok, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!("Transformed {} -> {}", args.input.file.display(), args.output.display());
    Ok(())
}

/// Relabel, mirror, rotate, then translate
fn apply_transform(wok: &mut Walkmesh, args: &TransformArgs) {
    for relabel in &args.relabel {
        wok.change_lyt_indexes(relabel.old, relabel.new);
    }
    wok.flip(args.flip_x, args.flip_y);
    if let Some(degrees) = args.rotate {
        wok.rotate(degrees);
    }
    if let Some(offset) = args.translate {
        wok.translate(offset.x, offset.y, offset.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Offset, Relabel};
    use std::path::PathBuf;
    use walkmesh::{BwmFace, SurfaceMaterial, Vector3, read_bwm};

    fn quad() -> Walkmesh {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 0.0, 0.0);
        let c = Vector3::new(1.0, 1.0, 0.0);
        let d = Vector3::new(0.0, 1.0, 0.0);
        let mut wok = Walkmesh::new();
        wok.faces.push(BwmFace::new(a, b, c, SurfaceMaterial::Grass));
        wok.faces.push(BwmFace::new(a, c, d, SurfaceMaterial::Grass));
        wok.faces[0].trans[0] = Some(2);
        wok
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bwmtool_{}_{}.wok", name, std::process::id()))
    }

    fn transform_args(input: PathBuf, output: PathBuf) -> TransformArgs {
        TransformArgs {
            input: WalkmeshArgs {
                file: input,
                offset: 0,
                size: 0,
            },
            output,
            translate: None,
            rotate: None,
            flip_x: false,
            flip_y: false,
            relabel: Vec::new(),
        }
    }

    #[test]
    fn test_apply_transform_order() {
        let mut args = transform_args(PathBuf::new(), PathBuf::new());
        args.translate = Some(Offset {
            x: 10.0,
            y: 0.0,
            z: 1.0,
        });
        args.flip_x = true;
        args.relabel.push(Relabel { old: 2, new: 5 });

        let mut wok = quad();
        apply_transform(&mut wok, &args);
        let (lo, hi) = wok.bounding_box().unwrap();
        assert_eq!((lo.x, hi.x), (9.0, 10.0));
        assert_eq!(lo.z, 1.0);
        assert!(wok.faces.iter().all(|f| f.normal().z > 0.0));
        assert!(wok.faces[0].trans.contains(&Some(5)));
    }

    #[test]
    fn test_transform_writes_file() {
        let input = temp_path("transform_in");
        let output = temp_path("transform_out");
        write_bwm(&quad(), &input).unwrap();

        let mut args = transform_args(input.clone(), output.clone());
        args.rotate = Some(180.0);
        run_transform(&args).unwrap();

        let wok = read_bwm(&fs::read(&output).unwrap()).unwrap();
        let (lo, hi) = wok.bounding_box().unwrap();
        assert!((lo.x + 1.0).abs() < 1e-6 && hi.x.abs() < 1e-6);
        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&output);
    }

    #[test]
    fn test_rewrite_and_dump() {
        let input = temp_path("rewrite_in");
        let output = temp_path("rewrite_out");
        let json = temp_path("dump").with_extension("json");
        write_bwm(&quad(), &input).unwrap();

        let source = WalkmeshArgs {
            file: input.clone(),
            offset: 0,
            size: 0,
        };
        run_rewrite(&RewriteArgs {
            input: source,
            output: output.clone(),
        })
        .unwrap();
        assert_eq!(fs::read(&input).unwrap(), fs::read(&output).unwrap());

        run_dump(&DumpArgs {
            input: WalkmeshArgs {
                file: output.clone(),
                offset: 0,
                size: 0,
            },
            output: Some(json.clone()),
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(value["walkmesh"]["faces"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["perimeters"], serde_json::json!([4]));

        for path in [&input, &output, &json] {
            let _ = fs::remove_file(path);
        }
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load(&WalkmeshArgs {
            file: PathBuf::from("/nonexistent/missing.wok"),
            offset: 0,
            size: 0,
        })
        .unwrap_err();
        assert!(err.to_string().contains("missing.wok"));
    }
}
