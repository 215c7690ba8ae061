#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .trim()
            .split(' ')
            .filter(|e| return !e.is_empty())
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }

        let prefix = args[0].to_string();
        args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_clear()
            || cmd.is_export()
            || cmd.is_history()
            || cmd.is_session()
            || cmd.is_help()
        {
            return Some(cmd);
        }

        return None;
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_clear(&self) -> bool {
        return ["/clear", "/new"].contains(&self.command.as_str());
    }

    pub fn is_export(&self) -> bool {
        return ["/x", "/export"].contains(&self.command.as_str());
    }

    pub fn is_history(&self) -> bool {
        return ["/l", "/load", "/history"].contains(&self.command.as_str());
    }

    pub fn is_session(&self) -> bool {
        return ["/s", "/session"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }

    pub fn first_arg(&self) -> Option<&str> {
        return self.args.first().map(|arg| return arg.as_str());
    }
}
